// ==========================================
// 库存健康监控系统 - 每日库存录入记录
// ==========================================
// 职责: daily_stock 原始记录 (录入/修改/删除的外部协作面)
// 主键: (date, location, item)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// StockEntryKey - 原始记录主键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockEntryKey {
    pub date: NaiveDate,
    pub location: String,
    pub item: String,
}

// ==========================================
// DailyStockEntry - 每日库存原始记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStockEntry {
    pub date: NaiveDate,
    pub location: String,
    pub item: String,

    // ===== 当日流水 =====
    pub opening_stock: i64,  // 期初库存
    pub received: i64,       // 当日入库
    pub issued: i64,         // 当日发放
    pub closing_stock: i64,  // 期末库存 (派生)

    // ===== 补货参数 =====
    pub lead_time_days: i64, // 供货周期
    pub reorder_level: i64,  // 再订货点
}

impl DailyStockEntry {
    pub fn key(&self) -> StockEntryKey {
        StockEntryKey {
            date: self.date,
            location: self.location.clone(),
            item: self.item.clone(),
        }
    }
}

// ==========================================
// StockMovement - 可编辑的数量字段
// ==========================================
// 录入与修改共用,期末库存始终由流水推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub opening_stock: i64,
    pub received: i64,
    pub issued: i64,
    pub lead_time_days: i64,
    pub reorder_level: i64,
}

impl StockMovement {
    /// 期末库存 = 期初 + 入库 - 发放
    ///
    /// 超出 i64 范围时返回 None
    pub fn closing_stock(&self) -> Option<i64> {
        self.opening_stock
            .checked_add(self.received)?
            .checked_sub(self.issued)
    }

    /// 组装完整记录 (期末库存溢出时返回 None)
    pub fn into_entry(self, key: StockEntryKey) -> Option<DailyStockEntry> {
        Some(DailyStockEntry {
            date: key.date,
            location: key.location,
            item: key.item,
            opening_stock: self.opening_stock,
            received: self.received,
            issued: self.issued,
            closing_stock: self.closing_stock()?,
            lead_time_days: self.lead_time_days,
            reorder_level: self.reorder_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_stock_is_derived_from_movement() {
        let movement = StockMovement {
            opening_stock: 120,
            received: 30,
            issued: 45,
            lead_time_days: 7,
            reorder_level: 100,
        };
        assert_eq!(movement.closing_stock(), Some(105));

        let key = StockEntryKey {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            location: "Clinic_Pune".to_string(),
            item: "Paracetamol".to_string(),
        };
        let entry = movement.into_entry(key.clone()).unwrap();
        assert_eq!(entry.closing_stock, 105);
        assert_eq!(entry.key(), key);
    }

    #[test]
    fn test_closing_stock_overflow_is_none() {
        let movement = StockMovement {
            opening_stock: i64::MAX,
            received: 1,
            issued: 0,
            lead_time_days: 7,
            reorder_level: 100,
        };
        assert_eq!(movement.closing_stock(), None);

        let key = StockEntryKey {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            location: "Clinic_Pune".to_string(),
            item: "Paracetamol".to_string(),
        };
        assert!(movement.into_entry(key).is_none());
    }
}
