// ==========================================
// 库存健康监控系统 - 命令行主入口
// ==========================================
// 用法:
//   stock-health-monitor [DB_PATH] [--snapshot-file FILE] [--json]
//                        [--export] [--export-date YYYYMMDD]
// 数据库路径: STOCK_HEALTH_DB_PATH → DB_PATH → 用户数据目录
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};

use stock_health_monitor::app::{resolve_db_path, AppState};
use stock_health_monitor::domain::parse_snapshot_date;
use stock_health_monitor::engine::alert_prioritizer::AlertStatus;
use stock_health_monitor::engine::reorder_list::ReorderStatus;
use stock_health_monitor::engine::risk_matrix::band_color;
use stock_health_monitor::{logging, StockHealthReport, StockStatus};

#[derive(Debug, Default)]
struct CliOptions {
    db_path: Option<String>,
    snapshot_file: Option<PathBuf>,
    json: bool,
    export: bool,
    export_date: Option<NaiveDate>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--export" => options.export = true,
            "--snapshot-file" | "--csv" => {
                let value = args.next().context("--snapshot-file 需要文件路径")?;
                options.snapshot_file = Some(PathBuf::from(value));
            }
            "--export-date" => {
                let value = args.next().context("--export-date 需要日期")?;
                let date = parse_snapshot_date(&value)
                    .with_context(|| format!("无法解析导出日期: {}", value))?;
                options.export_date = Some(date);
            }
            flag if flag.starts_with("--") => bail!("未知参数: {}", flag),
            path => {
                if options.db_path.is_some() {
                    bail!("多余的位置参数: {}", path);
                }
                options.db_path = Some(path.to_string());
            }
        }
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    let options = parse_args(std::env::args().skip(1))?;

    if options.json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("{} v{}", stock_health_monitor::APP_NAME, stock_health_monitor::VERSION);

    let db_path = resolve_db_path(options.db_path.as_deref());
    tracing::info!("使用数据库: {}", db_path);

    let state = match &options.snapshot_file {
        Some(file) => AppState::with_snapshot_file(db_path, file),
        None => AppState::new(db_path),
    }
    .map_err(anyhow::Error::msg)
    .context("无法初始化AppState")?;

    let report = match state.dashboard_api.get_report() {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "驾驶舱加载失败");
            return Err(e.into());
        }
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_dashboard(&report);
    }

    if options.export {
        let export_date = options
            .export_date
            .unwrap_or_else(|| Local::now().date_naive());
        match state.dashboard_api.write_reorder_export(export_date)? {
            Some(path) => eprintln!("补货清单已导出: {}", path.display()),
            None => eprintln!("无需补货,未生成导出文件"),
        }
    }

    Ok(())
}

// ==========================================
// 控制台驾驶舱
// ==========================================

fn print_dashboard(report: &StockHealthReport) {
    let date = report
        .snapshot_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("==================================================");
    println!("{}  快照日期: {}", stock_health_monitor::APP_NAME, date);
    println!("==================================================");

    // ===== 关键指标 =====
    let metrics = &report.metrics;
    println!(
        "条目 {} | 地点 {} | CRITICAL {} | WARNING {} | HEALTHY {} | OVERSTOCK {}",
        metrics.total_rows,
        metrics.location_count,
        metrics.critical_count,
        metrics.warning_count,
        metrics.healthy_count,
        metrics.overstock_count
    );

    // ===== 风险矩阵 =====
    println!();
    println!("--- 风险矩阵 (平均断货天数) ---");
    let matrix = &report.risk_matrix;
    if matrix.is_empty() {
        println!("(无数据)");
    } else {
        let item_width = matrix.items.iter().map(|i| i.chars().count()).max().unwrap_or(4).max(4);
        print!("{:<width$}", "item", width = item_width);
        for location in &matrix.locations {
            print!(" | {:>12}", location);
        }
        println!();

        for (item, cells) in matrix.items.iter().zip(&matrix.cells) {
            print!("{:<width$}", item, width = item_width);
            for cell in cells {
                match cell {
                    Some(days) => print!(" | {:>12.1}", days),
                    None => print!(" | {:>12}", "-"),
                }
            }
            println!();
        }

        let legend: Vec<String> = StockStatus::ALL
            .iter()
            .map(|s| format!("{} {}", s, band_color(*s)))
            .collect();
        println!("色带: {}", legend.join(", "));
    }

    // ===== 告警 =====
    println!();
    println!("--- 告警 ---");
    match report.alerts.status() {
        AlertStatus::AllHealthy => println!("全部健康"),
        AlertStatus::ActionRequired => {
            for entry in &report.alerts.top_critical {
                println!("[重点] {}", entry.narrative());
            }
            for entry in &report.alerts.entries {
                println!(
                    "{:<10} {} @ {}: {:.1} 天",
                    entry.stock_status.to_string(),
                    entry.item,
                    entry.location,
                    entry.days_until_stockout
                );
            }
        }
    }

    // ===== 补货清单 =====
    println!();
    println!("--- 补货清单 ---");
    match report.reorders.status() {
        ReorderStatus::NoReordersNeeded => println!("无需补货"),
        ReorderStatus::ReordersPending => {
            for entry in &report.reorders.entries {
                println!(
                    "{} @ {}: 库存 {}, 供货周期 {} 天, 断货 {:.1} 天, 建议 {} 件 [{}]",
                    entry.item,
                    entry.location,
                    entry.closing_stock,
                    entry.lead_time_days,
                    entry.days_until_stockout,
                    entry.suggested_reorder_qty,
                    entry.stock_status
                );
            }
            let summary = &report.reorders.summary;
            println!(
                "合计: {} 条, {} 件, 其中 CRITICAL {} 条",
                summary.item_count, summary.total_units, summary.critical_count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(args(&["stock.db", "--json", "--export", "--export-date", "20250301"])).unwrap();
        assert_eq!(options.db_path.as_deref(), Some("stock.db"));
        assert!(options.json);
        assert!(options.export);
        assert_eq!(options.export_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_parse_args_rejects_unknown_flag() {
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["--export-date"])).is_err());
    }
}
