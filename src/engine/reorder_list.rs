// ==========================================
// 库存健康监控系统 - 补货清单构建器
// ==========================================
// 职责: 筛选建议补货量 > 0 的行,按断货天数升序排列,
//       汇总统计并导出 CSV
// 输入: 已分级快照行
// 输出: ReorderReport / ReorderExport
// ==========================================
// 红线: 导出为纯投影,不重新计算
// 红线: 空清单呈现为"无需补货",不产出空文件
// ==========================================

use crate::domain::snapshot::ClassifiedRow;
use crate::domain::types::StockStatus;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 导出列 (固定顺序)
pub const REORDER_EXPORT_COLUMNS: [&str; 7] = [
    "location",
    "item",
    "closing_stock",
    "lead_time_days",
    "days_until_stockout",
    "suggested_reorder_qty",
    "stock_status",
];

// ==========================================
// ReorderEntry - 补货条目
// ==========================================
// 字段顺序即导出列顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub location: String,
    pub item: String,
    pub closing_stock: i64,
    pub lead_time_days: i64,
    pub days_until_stockout: f64,
    pub suggested_reorder_qty: i64,
    pub stock_status: StockStatus,
}

impl ReorderEntry {
    fn from_classified(row: &ClassifiedRow) -> Self {
        Self {
            location: row.row.location.clone(),
            item: row.row.item.clone(),
            closing_stock: row.row.closing_stock,
            lead_time_days: row.row.lead_time_days,
            days_until_stockout: row.days_until_stockout(),
            suggested_reorder_qty: row.row.suggested_reorder_qty,
            stock_status: row.stock_status(),
        }
    }
}

// ==========================================
// ReorderSummary - 汇总统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSummary {
    pub item_count: usize,     // 待补货条目数
    pub total_units: i64,      // 建议补货总量
    pub critical_count: usize, // 其中 CRITICAL 条目数
}

/// 补货呈现状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReorderStatus {
    NoReordersNeeded, // 无需补货
    ReordersPending,  // 存在待补货
}

// ==========================================
// ReorderExport - 导出文件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderExport {
    pub file_name: String,
    pub content: String,
}

/// 导出文件名: reorder_list_YYYYMMDD.csv
pub fn export_file_name(export_date: NaiveDate) -> String {
    format!("reorder_list_{}.csv", export_date.format("%Y%m%d"))
}

// ==========================================
// ReorderReport - 补货结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReorderReport {
    pub entries: Vec<ReorderEntry>,
    pub summary: ReorderSummary,
}

impl ReorderReport {
    pub fn status(&self) -> ReorderStatus {
        if self.entries.is_empty() {
            ReorderStatus::NoReordersNeeded
        } else {
            ReorderStatus::ReordersPending
        }
    }

    /// 导出 CSV
    ///
    /// # 返回
    /// - Ok(None): 无需补货,不产出文件
    /// - Ok(Some(ReorderExport)): 表头 + 固定列顺序的 CSV
    pub fn export_csv(&self, export_date: NaiveDate) -> EngineResult<Option<ReorderExport>> {
        if self.entries.is_empty() {
            return Ok(None);
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(REORDER_EXPORT_COLUMNS)?;
        for entry in &self.entries {
            writer.write_record([
                entry.location.clone(),
                entry.item.clone(),
                entry.closing_stock.to_string(),
                entry.lead_time_days.to_string(),
                format!("{:.1}", entry.days_until_stockout),
                entry.suggested_reorder_qty.to_string(),
                entry.stock_status.to_db_str().to_string(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| EngineError::ExportError(e.error().to_string()))?;
        let content =
            String::from_utf8(bytes).map_err(|e| EngineError::ExportError(e.to_string()))?;

        Ok(Some(ReorderExport {
            file_name: export_file_name(export_date),
            content,
        }))
    }
}

// ==========================================
// ReorderListBuilder - 补货清单构建器
// ==========================================
pub struct ReorderListBuilder;

impl ReorderListBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 生成补货清单
    pub fn build(&self, rows: &[ClassifiedRow]) -> ReorderReport {
        let mut entries: Vec<ReorderEntry> = rows
            .iter()
            .filter(|r| r.row.suggested_reorder_qty > 0)
            .map(ReorderEntry::from_classified)
            .collect();

        entries.sort_by(|a, b| a.days_until_stockout.total_cmp(&b.days_until_stockout));

        let summary = ReorderSummary {
            item_count: entries.len(),
            // 饱和累加,超大数量不会溢出
            total_units: entries
                .iter()
                .fold(0i64, |acc, e| acc.saturating_add(e.suggested_reorder_qty)),
            critical_count: entries
                .iter()
                .filter(|e| e.stock_status == StockStatus::Critical)
                .count(),
        };

        tracing::debug!(
            items = summary.item_count,
            total_units = summary.total_units,
            critical = summary.critical_count,
            "补货清单生成完成"
        );

        ReorderReport { entries, summary }
    }
}

impl Default for ReorderListBuilder {
    fn default() -> Self {
        Self::new()
    }
}
