// ==========================================
// 库存健康监控系统 - 每日库存录入 API
// ==========================================
// 职责: 原始记录的录入 / 修改 / 删除 / 查询
// 流程: 输入校验 → 推导期末库存 → 仓储写入 → 触发快照失效回调
// 说明: 驾驶舱核心从不调用本 API
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::stock_entry::{DailyStockEntry, StockEntryKey, StockMovement};
use crate::repository::daily_stock_repo::{DailyStockRepository, DEFAULT_RECENT_LIMIT};

/// 数据变更回调 (通常用于使快照缓存失效)
pub type ChangeHook = Arc<dyn Fn() + Send + Sync>;

// ==========================================
// StockEntryApi
// ==========================================
pub struct StockEntryApi {
    repo: Arc<DailyStockRepository>,
    on_change: Option<ChangeHook>,
}

impl StockEntryApi {
    pub fn new(repo: Arc<DailyStockRepository>) -> Self {
        Self {
            repo,
            on_change: None,
        }
    }

    /// 注册数据变更回调
    pub fn with_change_hook(mut self, hook: ChangeHook) -> Self {
        self.on_change = Some(hook);
        self
    }

    fn notify_change(&self) {
        if let Some(hook) = &self.on_change {
            hook();
        }
    }

    /// 录入新记录
    pub fn add_entry(&self, key: StockEntryKey, movement: StockMovement) -> ApiResult<DailyStockEntry> {
        let key = normalize_key(key)?;
        validate_movement(&movement)?;

        let entry = movement.into_entry(key).ok_or_else(closing_stock_overflow)?;
        self.repo.insert(&entry)?;
        tracing::info!(
            date = %entry.date,
            location = %entry.location,
            item = %entry.item,
            closing_stock = entry.closing_stock,
            "库存记录已录入"
        );

        self.notify_change();
        Ok(entry)
    }

    /// 修改已有记录 (主键不可改)
    pub fn edit_entry(&self, key: StockEntryKey, movement: StockMovement) -> ApiResult<DailyStockEntry> {
        let key = normalize_key(key)?;
        validate_movement(&movement)?;

        let entry = movement.into_entry(key).ok_or_else(closing_stock_overflow)?;
        self.repo.update(&entry)?;
        tracing::info!(
            date = %entry.date,
            location = %entry.location,
            item = %entry.item,
            closing_stock = entry.closing_stock,
            "库存记录已修改"
        );

        self.notify_change();
        Ok(entry)
    }

    /// 删除记录
    pub fn delete_entry(&self, key: StockEntryKey) -> ApiResult<()> {
        let key = normalize_key(key)?;
        self.repo.delete(&key)?;
        tracing::info!(date = %key.date, location = %key.location, item = %key.item, "库存记录已删除");

        self.notify_change();
        Ok(())
    }

    /// 按主键查询
    pub fn get_entry(&self, key: StockEntryKey) -> ApiResult<DailyStockEntry> {
        let key = normalize_key(key)?;
        self.repo.find(&key)?.ok_or_else(|| {
            ApiError::NotFound(format!("库存记录 {}/{}/{} 不存在", key.date, key.location, key.item))
        })
    }

    /// 最近记录 (默认 50 条)
    pub fn list_recent(&self, limit: Option<usize>) -> ApiResult<Vec<DailyStockEntry>> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(self.repo.list_recent(limit)?)
    }
}

// ==========================================
// 输入校验
// ==========================================

fn normalize_key(key: StockEntryKey) -> ApiResult<StockEntryKey> {
    let location = key.location.trim().to_string();
    let item = key.item.trim().to_string();

    if location.is_empty() {
        return Err(ApiError::InvalidInput("地点不能为空".to_string()));
    }
    if item.is_empty() {
        return Err(ApiError::InvalidInput("物品不能为空".to_string()));
    }

    Ok(StockEntryKey {
        date: key.date,
        location,
        item,
    })
}

fn validate_movement(movement: &StockMovement) -> ApiResult<()> {
    let quantities = [
        ("opening_stock", movement.opening_stock),
        ("received", movement.received),
        ("issued", movement.issued),
        ("reorder_level", movement.reorder_level),
    ];
    for (field, value) in quantities {
        if value < 0 {
            return Err(ApiError::InvalidInput(format!("{} 不能为负数: {}", field, value)));
        }
    }

    if movement.lead_time_days < 1 {
        return Err(ApiError::InvalidInput(format!(
            "供货周期至少为 1 天: {}",
            movement.lead_time_days
        )));
    }

    let closing_stock = movement.closing_stock().ok_or_else(closing_stock_overflow)?;
    if closing_stock < 0 {
        return Err(ApiError::InvalidInput(format!(
            "发放量超过可用库存, 期末库存为 {}",
            closing_stock
        )));
    }
    Ok(())
}

fn closing_stock_overflow() -> ApiError {
    ApiError::InvalidInput("期末库存超出可表示范围".to_string())
}
