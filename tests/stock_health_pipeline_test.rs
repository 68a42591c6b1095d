// ==========================================
// 风险分级流水线集成测试
// ==========================================
// 覆盖: 断货天数 / 状态分级 / 风险矩阵 / 告警 / 补货清单 的端到端场景
// ==========================================


use stock_health_monitor::domain::{Snapshot, StockStatus};
use stock_health_monitor::engine::alert_prioritizer::AlertStatus;
use stock_health_monitor::engine::reorder_list::ReorderStatus;
use stock_health_monitor::engine::StockHealthPipeline;
use stock_health_monitor::logging;
use test_helpers::{row, snapshot_date};

fn run(rows: Vec<stock_health_monitor::domain::StockSnapshotRow>) -> stock_health_monitor::StockHealthReport {
    logging::init_test();
    StockHealthPipeline::default().run(&Snapshot::from_rows(rows))
}

// ==========================================
// 单条分级
// ==========================================

#[test]
fn test_critical_row_two_days() {
    let report = run(vec![row("Hospital_Mumbai", "Insulin_Vials", 4, 2.0, 30)]);

    let classified = &report.rows[0];
    assert_eq!(classified.days_until_stockout(), 2.0);
    assert_eq!(classified.stock_status(), StockStatus::Critical);
}

#[test]
fn test_zero_usage_is_overstock_not_error() {
    let report = run(vec![row("Hospital_Mumbai", "Gauze_Rolls", 100, 0.0, 0)]);

    let classified = &report.rows[0];
    assert_eq!(classified.days_until_stockout(), 10000.0);
    assert_eq!(classified.stock_status(), StockStatus::Overstock);
    assert_eq!(report.alerts.status(), AlertStatus::AllHealthy);
}

#[test]
fn test_half_tenth_horizons_stay_in_lower_bucket() {
    // 41/20, 101/20, 201/20 舍入到偶数位后正好落在档位边界上
    let report = run(vec![
        row("Hospital_Delhi", "Gauze", 41, 20.0, 0),
        row("Hospital_Delhi", "Masks", 101, 20.0, 0),
        row("Hospital_Delhi", "Saline", 201, 20.0, 0),
    ]);

    let classified: Vec<(f64, StockStatus)> = report
        .rows
        .iter()
        .map(|r| (r.days_until_stockout(), r.stock_status()))
        .collect();
    assert_eq!(
        classified,
        vec![
            (2.0, StockStatus::Critical),
            (5.0, StockStatus::Warning),
            (10.0, StockStatus::Healthy),
        ]
    );
}

// ==========================================
// 告警排序与重点提示
// ==========================================

#[test]
fn test_alert_order_and_top_critical() {
    // 断货天数 1, 4, 8, 20 (日均消耗 1.0)
    let report = run(vec![
        row("Clinic_Pune", "Masks", 20, 1.0, 0),
        row("Clinic_Pune", "Gauze", 4, 1.0, 10),
        row("Clinic_Pune", "Saline", 1, 1.0, 25),
        row("Clinic_Pune", "Insulin", 8, 1.0, 0),
    ]);

    let days: Vec<f64> = report.alerts.entries.iter().map(|e| e.days_until_stockout).collect();
    assert_eq!(days, vec![1.0, 4.0]);

    let top: Vec<&str> = report.alerts.top_critical.iter().map(|e| e.item.as_str()).collect();
    assert_eq!(top, vec!["Saline"]);
    assert_eq!(report.alerts.status(), AlertStatus::ActionRequired);
}

#[test]
fn test_top_critical_capped_at_three() {
    let report = run(vec![
        row("A", "I1", 1, 1.0, 1),
        row("A", "I2", 2, 1.0, 1),
        row("B", "I3", 0, 1.0, 1),
        row("B", "I4", 1, 2.0, 1),
        row("C", "I5", 2, 2.0, 1),
    ]);

    assert_eq!(report.alerts.critical_count(), 5);
    assert_eq!(report.alerts.top_critical.len(), 3);
    assert_eq!(report.alerts.top_critical[0].item, "I3");
}

// ==========================================
// 补货清单
// ==========================================

#[test]
fn test_no_positive_quantity_means_no_reorders() {
    let report = run(vec![
        row("Clinic_Pune", "Masks", 2, 1.0, 0),
        row("Clinic_Pune", "Gauze", 40, 1.0, 0),
    ]);

    assert_eq!(report.reorders.status(), ReorderStatus::NoReordersNeeded);
    assert_eq!(report.reorders.summary.item_count, 0);
    assert_eq!(report.reorders.summary.total_units, 0);
    assert_eq!(report.reorders.summary.critical_count, 0);
    assert_eq!(report.reorders.export_csv(snapshot_date()).unwrap(), None);
}

#[test]
fn test_reorder_rollups_and_export() {
    let report = run(vec![
        row("Hospital_Delhi", "Masks", 30, 5.0, 120),
        row("Hospital_Delhi", "Gauze", 3, 2.0, 60),
        row("Hospital_Delhi", "Saline", 90, 1.0, 0),
    ]);

    let summary = report.reorders.summary;
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.total_units, 180);
    assert_eq!(summary.critical_count, 1);

    let export = report.reorders.export_csv(snapshot_date()).unwrap().unwrap();
    assert_eq!(export.file_name, "reorder_list_20250301.csv");

    let lines: Vec<&str> = export.content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "location,item,closing_stock,lead_time_days,days_until_stockout,suggested_reorder_qty,stock_status",
            "Hospital_Delhi,Gauze,3,7,1.5,60,CRITICAL",
            "Hospital_Delhi,Masks,30,7,6.0,120,HEALTHY",
        ]
    );
}

// ==========================================
// 风险矩阵
// ==========================================

#[test]
fn test_duplicate_pairs_average_in_matrix() {
    let report = run(vec![
        row("Hospital_Delhi", "Gauze", 6, 2.0, 0),
        row("Hospital_Delhi", "Gauze", 10, 2.0, 0),
        row("Clinic_Pune", "Masks", 7, 1.0, 0),
    ]);

    let matrix = &report.risk_matrix;
    assert_eq!(matrix.items, vec!["Gauze", "Masks"]);
    assert_eq!(matrix.locations, vec!["Clinic_Pune", "Hospital_Delhi"]);
    assert_eq!(matrix.cell("Gauze", "Hospital_Delhi"), Some(4.0));
    assert_eq!(matrix.band("Gauze", "Hospital_Delhi"), Some(StockStatus::Warning));
    assert_eq!(matrix.cell("Gauze", "Clinic_Pune"), None);
}

// ==========================================
// 空快照
// ==========================================

#[test]
fn test_empty_snapshot_degrades_gracefully() {
    let report = run(vec![]);

    assert!(report.is_empty_snapshot());
    assert!(report.risk_matrix.is_empty());
    assert_eq!(report.alerts.status(), AlertStatus::AllHealthy);
    assert_eq!(report.reorders.status(), ReorderStatus::NoReordersNeeded);
    assert_eq!(report.metrics.total_rows, 0);
}
