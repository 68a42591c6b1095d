// ==========================================
// 库存健康监控系统 - API 层
// ==========================================
// 职责: 对外业务接口,组合仓储与引擎
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod stock_entry_api;

// 重导出
pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use stock_entry_api::{ChangeHook, StockEntryApi};
