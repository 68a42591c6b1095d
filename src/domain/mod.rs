// ==========================================
// 库存健康监控系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod snapshot;
pub mod stock_entry;
pub mod types;

// 重导出核心类型
pub use snapshot::{
    parse_snapshot_date, ClassifiedRow, DerivedMetrics, RawSnapshotRecord, RowDefect, Snapshot,
    StockSnapshotRow,
};
pub use stock_entry::{DailyStockEntry, StockEntryKey, StockMovement};
pub use types::StockStatus;
