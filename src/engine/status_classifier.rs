// ==========================================
// 库存健康监控系统 - 库存状态分级器
// ==========================================
// 职责: 断货天数 → 四级库存状态
// 规则: 升序判定,首个命中即返回,边界值归入更紧急的一级
//   <= 2  → CRITICAL
//   <= 5  → WARNING
//   <= 10 → HEALTHY
//   其余  → OVERSTOCK
// ==========================================
// 红线: 风险矩阵的色带与本分级共用同一组阈值
// ==========================================

use crate::domain::snapshot::{ClassifiedRow, DerivedMetrics, Snapshot, StockSnapshotRow};
use crate::domain::types::StockStatus;
use crate::engine::risk_calculator::RiskCalculator;

/// CRITICAL 上限 (含)
pub const CRITICAL_MAX_DAYS: f64 = 2.0;
/// WARNING 上限 (含)
pub const WARNING_MAX_DAYS: f64 = 5.0;
/// HEALTHY 上限 (含)
pub const HEALTHY_MAX_DAYS: f64 = 10.0;

// ==========================================
// StatusClassifier - 状态分级器
// ==========================================
pub struct StatusClassifier {
    calculator: RiskCalculator,
}

impl StatusClassifier {
    pub fn new() -> Self {
        Self {
            calculator: RiskCalculator::new(),
        }
    }

    /// 断货天数 → 库存状态
    pub fn classify(days_until_stockout: f64) -> StockStatus {
        if days_until_stockout <= CRITICAL_MAX_DAYS {
            StockStatus::Critical
        } else if days_until_stockout <= WARNING_MAX_DAYS {
            StockStatus::Warning
        } else if days_until_stockout <= HEALTHY_MAX_DAYS {
            StockStatus::Healthy
        } else {
            StockStatus::Overstock
        }
    }

    /// 计算单行派生指标
    pub fn derive(&self, row: &StockSnapshotRow) -> DerivedMetrics {
        let days_until_stockout = self.calculator.days_until_stockout(row);
        DerivedMetrics {
            days_until_stockout,
            stock_status: Self::classify(days_until_stockout),
        }
    }

    /// 分级整份快照 (保持原始行顺序)
    pub fn classify_snapshot(&self, snapshot: &Snapshot) -> Vec<ClassifiedRow> {
        snapshot
            .rows
            .iter()
            .map(|row| ClassifiedRow {
                row: row.clone(),
                metrics: self.derive(row),
            })
            .collect()
    }
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new()
    }
}
