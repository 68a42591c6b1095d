// ==========================================
// 库存健康监控系统 - 引擎层
// ==========================================
// 职责: 库存风险分级与补货优先级规则
// 红线: Engine 不拼 SQL, 不做 I/O, 纯函数
// ==========================================

pub mod alert_prioritizer;
pub mod error;
pub mod key_metrics;
pub mod pipeline;
pub mod reorder_list;
pub mod risk_calculator;
pub mod risk_matrix;
pub mod status_classifier;

// 重导出核心引擎
pub use alert_prioritizer::{AlertEntry, AlertPrioritizer, AlertReport, AlertStatus};
pub use error::{EngineError, EngineResult};
pub use key_metrics::KeyMetrics;
pub use pipeline::{StockHealthPipeline, StockHealthReport};
pub use reorder_list::{
    ReorderEntry, ReorderExport, ReorderListBuilder, ReorderReport, ReorderStatus, ReorderSummary,
};
pub use risk_calculator::RiskCalculator;
pub use risk_matrix::{RiskMatrix, RiskMatrixBuilder};
pub use status_classifier::StatusClassifier;
