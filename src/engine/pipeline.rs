// ==========================================
// 库存健康监控系统 - 风险分级流水线
// ==========================================
// 职责: 单份快照 → 完整驾驶舱结果
// 流程: 断货天数 → 状态分级 → {风险矩阵, 告警, 补货清单, 关键指标}
// ==========================================
// 红线: 无状态,每次请求从原始行重新计算
// 红线: 相同输入必须得到相同输出
// ==========================================

use crate::domain::snapshot::{ClassifiedRow, Snapshot};
use crate::engine::alert_prioritizer::{AlertPrioritizer, AlertReport};
use crate::engine::key_metrics::KeyMetrics;
use crate::engine::reorder_list::{ReorderListBuilder, ReorderReport};
use crate::engine::risk_matrix::{RiskMatrix, RiskMatrixBuilder};
use crate::engine::status_classifier::StatusClassifier;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// StockHealthReport - 驾驶舱结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockHealthReport {
    pub snapshot_date: Option<NaiveDate>,
    pub rows: Vec<ClassifiedRow>,
    pub metrics: KeyMetrics,
    pub risk_matrix: RiskMatrix,
    pub alerts: AlertReport,
    pub reorders: ReorderReport,
}

impl StockHealthReport {
    /// 空快照 (降级呈现: 空矩阵 / 全部健康 / 无需补货)
    pub fn is_empty_snapshot(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// StockHealthPipeline - 流水线
// ==========================================
pub struct StockHealthPipeline {
    classifier: StatusClassifier,
    matrix_builder: RiskMatrixBuilder,
    alert_prioritizer: AlertPrioritizer,
    reorder_builder: ReorderListBuilder,
}

impl StockHealthPipeline {
    /// 构造函数
    ///
    /// # 参数
    /// - `top_critical_limit`: 重点提示条数
    pub fn new(top_critical_limit: usize) -> Self {
        Self {
            classifier: StatusClassifier::new(),
            matrix_builder: RiskMatrixBuilder::new(),
            alert_prioritizer: AlertPrioritizer::new(top_critical_limit),
            reorder_builder: ReorderListBuilder::new(),
        }
    }

    /// 执行流水线
    pub fn run(&self, snapshot: &Snapshot) -> StockHealthReport {
        if snapshot.is_empty() {
            tracing::warn!("快照为空,按全部健康/无需补货呈现");
        }

        let rows = self.classifier.classify_snapshot(snapshot);
        let metrics = KeyMetrics::from_rows(&rows);
        let risk_matrix = self.matrix_builder.build(&rows);
        let alerts = self.alert_prioritizer.prioritize(&rows);
        let reorders = self.reorder_builder.build(&rows);

        tracing::info!(
            date = ?snapshot.date,
            rows = metrics.total_rows,
            locations = metrics.location_count,
            critical = metrics.critical_count,
            warning = metrics.warning_count,
            reorders = reorders.summary.item_count,
            "库存风险分级完成"
        );

        StockHealthReport {
            snapshot_date: snapshot.date,
            rows,
            metrics,
            risk_matrix,
            alerts,
            reorders,
        }
    }
}

impl Default for StockHealthPipeline {
    fn default() -> Self {
        Self::new(crate::engine::alert_prioritizer::DEFAULT_TOP_CRITICAL_LIMIT)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::StockSnapshotRow;
    use crate::engine::alert_prioritizer::AlertStatus;
    use crate::engine::reorder_list::ReorderStatus;

    fn row(location: &str, item: &str, closing_stock: i64, usage: f64, qty: i64) -> StockSnapshotRow {
        StockSnapshotRow {
            location: location.to_string(),
            item: item.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            closing_stock,
            issued: 0,
            avg_daily_usage: usage,
            lead_time_days: 7,
            reorder_level: 10,
            suggested_reorder_qty: qty,
        }
    }

    #[test]
    fn test_empty_snapshot_degrades_gracefully() {
        let report = StockHealthPipeline::default().run(&Snapshot::empty());

        assert!(report.is_empty_snapshot());
        assert!(report.risk_matrix.is_empty());
        assert_eq!(report.alerts.status(), AlertStatus::AllHealthy);
        assert_eq!(report.reorders.status(), ReorderStatus::NoReordersNeeded);
        assert_eq!(report.snapshot_date, None);
    }

    #[test]
    fn test_full_run_wires_all_stages() {
        let snapshot = Snapshot::from_rows(vec![
            row("Mumbai", "Insulin", 4, 2.0, 100),
            row("Mumbai", "Gauze", 100, 0.0, 0),
            row("Delhi", "Insulin", 12, 3.0, 20),
        ]);
        let report = StockHealthPipeline::default().run(&snapshot);

        assert_eq!(report.metrics.total_rows, 3);
        assert_eq!(report.metrics.location_count, 2);
        assert_eq!(report.metrics.critical_count, 1);
        assert_eq!(report.metrics.warning_count, 1);
        assert_eq!(report.metrics.overstock_count, 1);
        assert_eq!(report.risk_matrix.cell("Gauze", "Mumbai"), Some(10000.0));
        assert_eq!(report.risk_matrix.cell("Gauze", "Delhi"), None);
        assert_eq!(report.alerts.entries.len(), 2);
        assert_eq!(report.alerts.top_critical.len(), 1);
        assert_eq!(report.reorders.summary.total_units, 120);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let snapshot = Snapshot::from_rows(vec![
            row("Mumbai", "Insulin", 4, 2.0, 100),
            row("Delhi", "Masks", 7, 1.0, 15),
        ]);
        let pipeline = StockHealthPipeline::default();
        assert_eq!(pipeline.run(&snapshot), pipeline.run(&snapshot));
    }
}
