// ==========================================
// 库存健康监控系统 - 演示数据库初始化
// ==========================================
// 用法: seed_demo_db [DB_PATH] [DAYS]
// 说明:
// - 已有数据库先备份再重建
// - daily_stock 写入 DAYS 天的流水
// - stock_health_metrics 按最近流水模拟上游刷新
// ==========================================

use chrono::{Duration, Local, NaiveDate};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use stock_health_monitor::app::resolve_db_path;
use stock_health_monitor::db::{init_schema, open_sqlite_connection};

const DEFAULT_DAYS: i64 = 14;

const LOCATIONS: [&str; 4] = ["Clinic_Pune", "Hospital_Delhi", "Hospital_Mumbai", "Warehouse_Chennai"];

/// (物品, 基准日耗, 供货周期, 再订货点)
const ITEMS: [(&str, i64, i64, i64); 5] = [
    ("Gauze_Rolls", 25, 3, 120),
    ("Insulin_Vials", 8, 7, 60),
    ("Masks_N95", 40, 5, 250),
    ("Paracetamol_Strips", 30, 4, 150),
    ("Saline_Bags", 12, 6, 80),
];

fn main() -> Result<(), Box<dyn Error>> {
    stock_health_monitor::logging::init();

    let db_arg = std::env::args().nth(1);
    let db_path = resolve_db_path(db_arg.as_deref());

    let days = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_DAYS)
        .max(1);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    let end_date = Local::now().date_naive();
    seed_daily_stock(&conn, end_date, days)?;
    let refreshed = refresh_health_metrics(&conn, end_date)?;

    tracing::info!(db_path = %db_path, days, refreshed, "演示数据初始化完成");
    print_quick_counts(&conn)?;
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

/// 确定性的日耗波动 (不同地点/物品/日期错开)
fn daily_issue(base: i64, loc_idx: usize, item_idx: usize, day: i64) -> i64 {
    let wobble = ((loc_idx as i64 * 7 + item_idx as i64 * 3 + day * 5) % 9) - 4;
    // 部分组合几乎不消耗,用于演示 OVERSTOCK
    if (loc_idx + item_idx) % 7 == 6 {
        return 0;
    }
    (base + wobble * base / 10).max(0)
}

fn seed_daily_stock(conn: &Connection, end_date: NaiveDate, days: i64) -> Result<(), Box<dyn Error>> {
    let start_date = end_date - Duration::days(days - 1);
    let tx = conn.unchecked_transaction()?;

    for (loc_idx, location) in LOCATIONS.iter().enumerate() {
        for (item_idx, (item, base_usage, lead_time, reorder_level)) in ITEMS.iter().enumerate() {
            // 起始库存错开,使最后一天覆盖全部四个状态
            let mut opening = base_usage * (days + 2 + ((loc_idx * 5 + item_idx * 3) % 11) as i64);

            for day in 0..days {
                let date = start_date + Duration::days(day);
                let issued = daily_issue(*base_usage, loc_idx, item_idx, day).min(opening);
                let received = if day % 6 == 5 { base_usage * 2 } else { 0 };
                let closing = opening + received - issued;

                tx.execute(
                    r#"
                    INSERT INTO daily_stock (
                        date, location, item,
                        opening_stock, received, issued, closing_stock,
                        lead_time_days, reorder_level
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                    params![
                        date.to_string(),
                        location,
                        item,
                        opening,
                        received,
                        issued,
                        closing,
                        lead_time,
                        reorder_level,
                    ],
                )?;
                opening = closing;
            }
        }
    }

    tx.commit()?;
    Ok(())
}

/// 模拟上游刷新: 最近 7 天平均发放量 + 覆盖供货周期的建议补货量
fn refresh_health_metrics(conn: &Connection, end_date: NaiveDate) -> Result<usize, Box<dyn Error>> {
    let window_start = end_date - Duration::days(6);

    let mut usage: BTreeMap<(String, String), (i64, i64)> = BTreeMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT location, item, issued FROM daily_stock WHERE date >= ?1 AND date <= ?2",
        )?;
        let rows = stmt.query_map(params![window_start.to_string(), end_date.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
        })?;
        for row in rows {
            let (location, item, issued) = row?;
            let acc = usage.entry((location, item)).or_insert((0, 0));
            acc.0 += issued;
            acc.1 += 1;
        }
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM stock_health_metrics", [])?;

    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            r#"
            SELECT location, item, closing_stock, issued, lead_time_days, reorder_level
            FROM daily_stock WHERE date = ?1
            "#,
        )?;
        let latest = stmt
            .query_map(params![end_date.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (location, item, closing, issued, lead_time, reorder_level) in latest {
            let (total, n) = usage
                .get(&(location.clone(), item.clone()))
                .copied()
                .unwrap_or((0, 0));
            let avg_usage = if n > 0 { total as f64 / n as f64 } else { 0.0 };
            let target = reorder_level as f64 + avg_usage * lead_time as f64;
            let suggested = (target - closing as f64).ceil().max(0.0) as i64;

            tx.execute(
                r#"
                INSERT INTO stock_health_metrics (
                    location, item, date, closing_stock, issued, avg_daily_usage,
                    suggested_reorder_qty, lead_time_days, reorder_level
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    location,
                    item,
                    end_date.to_string(),
                    closing,
                    issued,
                    avg_usage,
                    suggested,
                    lead_time,
                    reorder_level,
                ],
            )?;
            count += 1;
        }
    }

    tx.commit()?;
    Ok(count)
}

fn print_quick_counts(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let tables = ["daily_stock", "stock_health_metrics", "config_kv"];

    eprintln!("Row counts:");
    for t in tables {
        let sql = format!("SELECT COUNT(*) FROM {}", t);
        let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        eprintln!("  {:<24} {}", t, n);
    }
    Ok(())
}
