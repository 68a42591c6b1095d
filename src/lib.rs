// ==========================================
// 库存健康监控系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 补货决策支持 (只读驾驶舱 + 原始记录录入)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 风险分级规则
pub mod engine;

// 导入层 - 快照文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 实例组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::StockStatus;

// 领域实体
pub use domain::{
    ClassifiedRow, DailyStockEntry, DerivedMetrics, Snapshot, StockEntryKey, StockMovement,
    StockSnapshotRow,
};

// 引擎
pub use engine::{
    AlertPrioritizer, AlertReport, KeyMetrics, ReorderListBuilder, ReorderReport, RiskCalculator,
    RiskMatrix, RiskMatrixBuilder, StatusClassifier, StockHealthPipeline, StockHealthReport,
};

// 数据源
pub use repository::{CachedSnapshotSource, SnapshotSource, SqliteSnapshotRepository};
pub use importer::SnapshotFileSource;

// API
pub use api::{ApiError, ApiResult, DashboardApi, StockEntryApi};

// ==========================================
// 版本信息
// ==========================================
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "库存健康监控系统";
