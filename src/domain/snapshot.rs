// ==========================================
// 库存健康监控系统 - 库存快照领域模型
// ==========================================
// 职责: 快照行、派生指标、加载暂存记录
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

use crate::domain::types::StockStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// StockSnapshotRow - 快照行
// ==========================================
// 用途: 单个 (地点, 物品) 在某一日期的观测值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshotRow {
    pub location: String,           // 地点
    pub item: String,               // 物品
    pub date: NaiveDate,            // 观测日期

    // ===== 库存数量 =====
    pub closing_stock: i64,         // 期末库存
    pub issued: i64,                // 本期发放 (仅展示)
    pub avg_daily_usage: f64,       // 日均消耗

    // ===== 补货参数 (上游提供) =====
    pub lead_time_days: i64,        // 供货周期
    pub reorder_level: i64,         // 再订货点
    pub suggested_reorder_qty: i64, // 建议补货量
}

// ==========================================
// DerivedMetrics - 派生指标
// ==========================================
// 每次快照重新计算,不落库
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub days_until_stockout: f64,
    pub stock_status: StockStatus,
}

/// 快照行 + 派生指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRow {
    #[serde(flatten)]
    pub row: StockSnapshotRow,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

impl ClassifiedRow {
    pub fn days_until_stockout(&self) -> f64 {
        self.metrics.days_until_stockout
    }

    pub fn stock_status(&self) -> StockStatus {
        self.metrics.stock_status
    }
}

// ==========================================
// Snapshot - 单日快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 快照日期 (空快照为 None)
    pub date: Option<NaiveDate>,
    pub rows: Vec<StockSnapshotRow>,
}

impl Snapshot {
    /// 由已校验的行构造快照,日期取行内最大日期
    pub fn from_rows(rows: Vec<StockSnapshotRow>) -> Self {
        let date = rows.iter().map(|r| r.date).max();
        Self { date, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ==========================================
// RawSnapshotRecord - 加载暂存记录
// ==========================================
// 所有加载器 (SQLite / CSV / Excel) 先产出暂存记录,再统一校验
// 红线: 字段缺失或越界时整份快照失败,不允许静默丢弃或补默认值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSnapshotRecord {
    pub location: Option<String>,
    pub item: Option<String>,
    pub date: Option<NaiveDate>,
    pub closing_stock: Option<i64>,
    pub issued: Option<i64>,
    pub avg_daily_usage: Option<f64>,
    pub lead_time_days: Option<i64>,
    pub reorder_level: Option<i64>,
    pub suggested_reorder_qty: Option<i64>,

    // 元信息
    pub row_number: usize,
}

/// 行缺陷 (字段 + 原因)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDefect {
    pub row_number: usize,
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for RowDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "行 {} 字段 {}: {}", self.row_number, self.field, self.message)
    }
}

impl RawSnapshotRecord {
    /// 校验并转换为快照行
    pub fn validate(self) -> Result<StockSnapshotRow, RowDefect> {
        let row_number = self.row_number;
        let defect = |field: &'static str, message: &str| RowDefect {
            row_number,
            field,
            message: message.to_string(),
        };

        let location = required_text(self.location).ok_or_else(|| defect("location", "缺失或为空"))?;
        let item = required_text(self.item).ok_or_else(|| defect("item", "缺失或为空"))?;
        let date = self.date.ok_or_else(|| defect("date", "缺失"))?;

        let closing_stock = non_negative(self.closing_stock, "closing_stock", row_number)?;
        let issued = non_negative(self.issued, "issued", row_number)?;
        let reorder_level = non_negative(self.reorder_level, "reorder_level", row_number)?;
        let suggested_reorder_qty =
            non_negative(self.suggested_reorder_qty, "suggested_reorder_qty", row_number)?;

        let lead_time_days = self.lead_time_days.ok_or_else(|| defect("lead_time_days", "缺失"))?;
        if lead_time_days < 1 {
            return Err(defect("lead_time_days", &format!("必须 >= 1, 实际 {}", lead_time_days)));
        }

        let avg_daily_usage = self
            .avg_daily_usage
            .ok_or_else(|| defect("avg_daily_usage", "缺失"))?;
        if !avg_daily_usage.is_finite() || avg_daily_usage < 0.0 {
            return Err(defect(
                "avg_daily_usage",
                &format!("必须为非负有限数, 实际 {}", avg_daily_usage),
            ));
        }

        Ok(StockSnapshotRow {
            location,
            item,
            date,
            closing_stock,
            issued,
            avg_daily_usage,
            lead_time_days,
            reorder_level,
            suggested_reorder_qty,
        })
    }
}

fn required_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_negative(value: Option<i64>, field: &'static str, row_number: usize) -> Result<i64, RowDefect> {
    match value {
        None => Err(RowDefect {
            row_number,
            field,
            message: "缺失".to_string(),
        }),
        Some(v) if v < 0 => Err(RowDefect {
            row_number,
            field,
            message: format!("不能为负数, 实际 {}", v),
        }),
        Some(v) => Ok(v),
    }
}

/// 解析快照日期
///
/// 支持 `YYYY-MM-DD`、`YYYYMMDD`,以及带时间部分的 `YYYY-MM-DD HH:MM:SS`
pub fn parse_snapshot_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()
        .or_else(|| {
            value
                .get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        })
}
