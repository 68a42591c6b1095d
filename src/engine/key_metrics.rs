// ==========================================
// 库存健康监控系统 - 关键指标
// ==========================================
// 职责: 驾驶舱顶部指标 (各状态条目数、条目总数、地点数)
// ==========================================

use crate::domain::snapshot::ClassifiedRow;
use crate::domain::types::StockStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub total_rows: usize,
    pub location_count: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub healthy_count: usize,
    pub overstock_count: usize,
}

impl KeyMetrics {
    pub fn from_rows(rows: &[ClassifiedRow]) -> Self {
        let mut metrics = KeyMetrics {
            total_rows: rows.len(),
            location_count: rows
                .iter()
                .map(|r| r.row.location.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
            ..Default::default()
        };

        for r in rows {
            match r.stock_status() {
                StockStatus::Critical => metrics.critical_count += 1,
                StockStatus::Warning => metrics.warning_count += 1,
                StockStatus::Healthy => metrics.healthy_count += 1,
                StockStatus::Overstock => metrics.overstock_count += 1,
            }
        }

        metrics
    }

    /// 指定状态的条目数
    pub fn count(&self, status: StockStatus) -> usize {
        match status {
            StockStatus::Critical => self.critical_count,
            StockStatus::Warning => self.warning_count,
            StockStatus::Healthy => self.healthy_count,
            StockStatus::Overstock => self.overstock_count,
        }
    }
}
