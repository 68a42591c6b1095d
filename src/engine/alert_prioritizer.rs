// ==========================================
// 库存健康监控系统 - 告警优先级排序
// ==========================================
// 职责: 筛选 CRITICAL/WARNING 行,按断货天数升序排列
//       并提取前 N 条 CRITICAL 作为重点提示
// 输入: 已分级快照行
// 输出: AlertReport
// ==========================================
// 红线: 稳定排序 (同天数保持原始行顺序)
// 红线: 无告警是合法结果,必须显式呈现"全部健康"
// ==========================================

use crate::domain::snapshot::ClassifiedRow;
use crate::domain::types::StockStatus;
use serde::{Deserialize, Serialize};

/// 重点提示默认条数
pub const DEFAULT_TOP_CRITICAL_LIMIT: usize = 3;

// ==========================================
// AlertEntry - 告警条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEntry {
    pub location: String,
    pub item: String,
    pub closing_stock: i64,
    pub avg_daily_usage: f64,
    pub days_until_stockout: f64,
    pub stock_status: StockStatus,
    pub suggested_reorder_qty: i64,
}

impl AlertEntry {
    fn from_classified(row: &ClassifiedRow) -> Self {
        Self {
            location: row.row.location.clone(),
            item: row.row.item.clone(),
            closing_stock: row.row.closing_stock,
            avg_daily_usage: row.row.avg_daily_usage,
            days_until_stockout: row.days_until_stockout(),
            stock_status: row.stock_status(),
            suggested_reorder_qty: row.row.suggested_reorder_qty,
        }
    }

    /// 重点提示文案
    pub fn narrative(&self) -> String {
        format!(
            "{} @ {}: 仅剩 {:.1} 天, 当前库存 {} 件, 日均消耗 {:.0} 件/天, 建议订购 {} 件",
            self.item,
            self.location,
            self.days_until_stockout,
            self.closing_stock,
            self.avg_daily_usage,
            self.suggested_reorder_qty
        )
    }
}

// ==========================================
// AlertReport - 告警结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertReport {
    /// CRITICAL + WARNING,断货天数升序
    pub entries: Vec<AlertEntry>,
    /// 前 N 条 CRITICAL (同一排序)
    pub top_critical: Vec<AlertEntry>,
}

/// 告警呈现状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    AllHealthy,     // 全部健康
    ActionRequired, // 需要处理
}

impl AlertReport {
    pub fn status(&self) -> AlertStatus {
        if self.entries.is_empty() {
            AlertStatus::AllHealthy
        } else {
            AlertStatus::ActionRequired
        }
    }

    pub fn critical_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.stock_status == StockStatus::Critical)
            .count()
    }
}

// ==========================================
// AlertPrioritizer - 告警优先级排序器
// ==========================================
pub struct AlertPrioritizer {
    top_critical_limit: usize,
}

impl AlertPrioritizer {
    pub fn new(top_critical_limit: usize) -> Self {
        Self { top_critical_limit }
    }

    /// 生成告警结果
    pub fn prioritize(&self, rows: &[ClassifiedRow]) -> AlertReport {
        let mut entries: Vec<AlertEntry> = rows
            .iter()
            .filter(|r| r.stock_status().is_alert())
            .map(AlertEntry::from_classified)
            .collect();

        // sort_by 为稳定排序
        entries.sort_by(|a, b| a.days_until_stockout.total_cmp(&b.days_until_stockout));

        let top_critical: Vec<AlertEntry> = entries
            .iter()
            .filter(|e| e.stock_status == StockStatus::Critical)
            .take(self.top_critical_limit)
            .cloned()
            .collect();

        tracing::debug!(
            alerts = entries.len(),
            top_critical = top_critical.len(),
            "告警排序完成"
        );

        AlertReport {
            entries,
            top_critical,
        }
    }
}

impl Default for AlertPrioritizer {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_CRITICAL_LIMIT)
    }
}
