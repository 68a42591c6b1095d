// ==========================================
// 库存健康监控系统 - 引擎配置
// ==========================================

use crate::engine::alert_prioritizer::DEFAULT_TOP_CRITICAL_LIMIT;
use crate::repository::snapshot_cache::DEFAULT_SNAPSHOT_TTL_SECS;
use std::path::PathBuf;
use std::time::Duration;

/// 引擎运行参数
///
/// 分级阈值为固定常量,不在此处配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub snapshot_cache_ttl: Duration,
    pub top_critical_limit: usize,
    pub export_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_cache_ttl: Duration::from_secs(DEFAULT_SNAPSHOT_TTL_SECS),
            top_critical_limit: DEFAULT_TOP_CRITICAL_LIMIT,
            export_dir: PathBuf::from("."),
        }
    }
}
