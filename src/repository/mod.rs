// ==========================================
// 库存健康监控系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod daily_stock_repo;
pub mod error;
pub mod snapshot_cache;
pub mod snapshot_repo;
pub mod snapshot_source;

// 重导出核心仓储
pub use daily_stock_repo::{DailyStockRepository, DEFAULT_RECENT_LIMIT};
pub use error::{RepositoryError, RepositoryResult};
pub use snapshot_cache::{CacheEntry, CachedSnapshotSource, DEFAULT_SNAPSHOT_TTL_SECS};
pub use snapshot_repo::{SqliteSnapshotRepository, REQUIRED_SNAPSHOT_COLUMNS, SNAPSHOT_VIEW};
pub use snapshot_source::SnapshotSource;
