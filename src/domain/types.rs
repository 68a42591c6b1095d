// ==========================================
// 库存健康监控系统 - 领域类型定义
// ==========================================
// 红线: 分级制,不是评分制
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 库存状态 (Stock Status)
// ==========================================
// 顺序: Critical < Warning < Healthy < Overstock (越靠前越紧急)
// 注意: OVERSTOCK 表示"可用天数充足",并非实物积压,命名保持不变
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库/导出一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Critical,  // 危急
    Warning,   // 预警
    Healthy,   // 健康
    Overstock, // 充足
}

impl StockStatus {
    /// 全部状态 (按紧急程度降序)
    pub const ALL: [StockStatus; 4] = [
        StockStatus::Critical,
        StockStatus::Warning,
        StockStatus::Healthy,
        StockStatus::Overstock,
    ];

    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CRITICAL" => Some(StockStatus::Critical),
            "WARNING" => Some(StockStatus::Warning),
            "HEALTHY" => Some(StockStatus::Healthy),
            "OVERSTOCK" => Some(StockStatus::Overstock),
            _ => None,
        }
    }

    /// 转换为数据库/导出使用的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            StockStatus::Critical => "CRITICAL",
            StockStatus::Warning => "WARNING",
            StockStatus::Healthy => "HEALTHY",
            StockStatus::Overstock => "OVERSTOCK",
        }
    }

    /// 是否进入告警列表 (CRITICAL / WARNING)
    pub fn is_alert(&self) -> bool {
        matches!(self, StockStatus::Critical | StockStatus::Warning)
    }

    /// 是否至少与 other 一样紧急
    pub fn is_at_least_as_urgent_as(&self, other: StockStatus) -> bool {
        *self <= other
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_order_is_urgency_order() {
        assert!(StockStatus::Critical < StockStatus::Warning);
        assert!(StockStatus::Warning < StockStatus::Healthy);
        assert!(StockStatus::Healthy < StockStatus::Overstock);
        assert!(StockStatus::Critical.is_at_least_as_urgent_as(StockStatus::Overstock));
        assert!(!StockStatus::Overstock.is_at_least_as_urgent_as(StockStatus::Healthy));
    }

    #[test]
    fn test_status_string_mapping() {
        for status in StockStatus::ALL {
            assert_eq!(StockStatus::from_str(status.to_db_str()), Some(status));
        }
        assert_eq!(StockStatus::from_str(" warning "), Some(StockStatus::Warning));
        assert_eq!(StockStatus::from_str("UNKNOWN"), None);
        assert_eq!(StockStatus::Overstock.to_string(), "OVERSTOCK");
    }

    #[test]
    fn test_status_serde_uses_screaming_case() {
        let json = serde_json::to_string(&StockStatus::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        let parsed: StockStatus = serde_json::from_str("\"HEALTHY\"").unwrap();
        assert_eq!(parsed, StockStatus::Healthy);
    }

    #[test]
    fn test_alert_membership() {
        assert!(StockStatus::Critical.is_alert());
        assert!(StockStatus::Warning.is_alert());
        assert!(!StockStatus::Healthy.is_alert());
        assert!(!StockStatus::Overstock.is_alert());
    }
}
