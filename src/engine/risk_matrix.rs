// ==========================================
// 库存健康监控系统 - 风险矩阵构建器
// ==========================================
// 职责: 物品 × 地点 交叉表,单元格为断货天数均值
// 输入: 已分级快照行
// 输出: RiskMatrix (行 = 物品, 列 = 地点)
// ==========================================
// 红线: 无数据的组合为 None,不得折算为 0
// 红线: 同键重复行取均值,不报错
// ==========================================

use crate::domain::snapshot::ClassifiedRow;
use crate::domain::types::StockStatus;
use crate::engine::status_classifier::StatusClassifier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// RiskMatrix - 风险矩阵
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMatrix {
    /// 行标签 (物品, 字典序)
    pub items: Vec<String>,
    /// 列标签 (地点, 字典序)
    pub locations: Vec<String>,
    /// cells[i][j] = items[i] 在 locations[j] 的平均断货天数
    pub cells: Vec<Vec<Option<f64>>>,
}

impl RiskMatrix {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 查询单元格
    ///
    /// # 返回
    /// - Some(days): 有数据
    /// - None: 无此物品/地点、该组合无数据,或 cells 维度与标签不一致
    pub fn cell(&self, item: &str, location: &str) -> Option<f64> {
        let i = self.items.iter().position(|v| v == item)?;
        let j = self.locations.iter().position(|v| v == location)?;
        self.cells.get(i)?.get(j).copied().flatten()
    }

    /// 单元格色带 (与状态分级同一阈值)
    pub fn band(&self, item: &str, location: &str) -> Option<StockStatus> {
        self.cell(item, location).map(band_of)
    }
}

/// 数值 → 色带
pub fn band_of(days_until_stockout: f64) -> StockStatus {
    StatusClassifier::classify(days_until_stockout)
}

/// 色带配色 (前端渲染用)
pub fn band_color(band: StockStatus) -> &'static str {
    match band {
        StockStatus::Critical => "#ff6b6b",
        StockStatus::Warning => "#feca57",
        StockStatus::Healthy => "#48dbfb",
        StockStatus::Overstock => "#1dd1a1",
    }
}

// ==========================================
// RiskMatrixBuilder - 风险矩阵构建器
// ==========================================
pub struct RiskMatrixBuilder;

impl RiskMatrixBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 构建风险矩阵
    pub fn build(&self, rows: &[ClassifiedRow]) -> RiskMatrix {
        // (item, location) → (sum, count)
        let mut acc: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
        let mut items = BTreeSet::new();
        let mut locations = BTreeSet::new();

        for r in rows {
            let item = r.row.item.as_str();
            let location = r.row.location.as_str();
            items.insert(item);
            locations.insert(location);

            let entry = acc.entry((item, location)).or_insert((0.0, 0));
            entry.0 += r.days_until_stockout();
            entry.1 += 1;
        }

        let cells: Vec<Vec<Option<f64>>> = items
            .iter()
            .map(|item| {
                locations
                    .iter()
                    .map(|location| {
                        acc.get(&(*item, *location))
                            .map(|(sum, count)| sum / *count as f64)
                    })
                    .collect()
            })
            .collect();

        tracing::debug!(
            items = items.len(),
            locations = locations.len(),
            "风险矩阵构建完成"
        );

        RiskMatrix {
            items: items.into_iter().map(str::to_string).collect(),
            locations: locations.into_iter().map(str::to_string).collect(),
            cells,
        }
    }
}

impl Default for RiskMatrixBuilder {
    fn default() -> Self {
        Self::new()
    }
}
