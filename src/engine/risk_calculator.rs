// ==========================================
// 库存健康监控系统 - 断货天数计算器
// ==========================================
// 职责: 由期末库存与日均消耗推导断货天数
// 输入: StockSnapshotRow
// 输出: days_until_stockout (保留 1 位小数)
// ==========================================
// 红线: 纯函数,对合法输入不报错、不产生 inf/NaN
// ==========================================

use crate::domain::snapshot::StockSnapshotRow;

/// 日均消耗下限 (仅用于除法,不改写原始消耗值)
pub const USAGE_EPSILON: f64 = 0.01;

// ==========================================
// RiskCalculator - 断货天数计算器
// ==========================================
pub struct RiskCalculator {
    // 无状态计算器,不需要注入依赖
}

impl RiskCalculator {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算断货天数
    ///
    /// # 规则
    /// days_until_stockout = round(closing_stock / max(avg_daily_usage, 0.01), 1)
    ///
    /// # 说明
    /// - 日均消耗为 0 时按 0.01 计算,得到一个很大的有限值
    /// - row.avg_daily_usage 本身保持不变,供展示使用
    pub fn days_until_stockout(&self, row: &StockSnapshotRow) -> f64 {
        let usage = Self::effective_usage(row.avg_daily_usage);
        round_to_one_decimal(row.closing_stock as f64 / usage)
    }

    /// 除法使用的日均消耗 (下限 USAGE_EPSILON)
    pub fn effective_usage(avg_daily_usage: f64) -> f64 {
        avg_daily_usage.max(USAGE_EPSILON)
    }
}

impl Default for RiskCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// 保留 1 位小数 (银行家舍入: 恰为 .x5 时取偶数位)
///
/// 分级基于舍入后的值,舍入规则决定边界行落入哪个档位
pub fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
