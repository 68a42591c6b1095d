// ==========================================
// 库存健康监控系统 - 应用状态
// ==========================================
// 职责: 组装共享连接、配置、快照数据源与 API 实例
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::api::{DashboardApi, StockEntryApi};
use crate::config::{ConfigManager, EngineConfig};
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::SnapshotFileSource;
use crate::repository::{
    CachedSnapshotSource, DailyStockRepository, SnapshotSource, SqliteSnapshotRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "STOCK_HEALTH_DB_PATH";

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 引擎配置
    pub config: EngineConfig,

    /// 快照数据源 (带 TTL 缓存)
    pub snapshot_source: Arc<dyn SnapshotSource>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,

    /// 每日库存录入API
    pub stock_entry_api: Arc<StockEntryApi>,
}

impl AppState {
    /// 创建新的AppState实例 (快照读自 SQLite)
    ///
    /// # 说明
    /// 1. 打开共享连接并确保 schema 存在
    /// 2. 从 config_kv 读取引擎配置
    /// 3. 组装缓存数据源与 API,录入变更时使缓存失效
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::build(db_path, None)
    }

    /// 创建AppState实例,快照改读外部文件 (CSV / Excel)
    ///
    /// 录入 API 仍写入 SQLite 的 daily_stock 表
    pub fn with_snapshot_file(db_path: String, snapshot_file: &Path) -> Result<Self, String> {
        Self::build(db_path, Some(snapshot_file))
    }

    fn build(db_path: String, snapshot_file: Option<&Path>) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())
            .and_then(|manager| manager.load_engine_config())
            .map_err(|e| format!("配置加载失败: {}", e))?;

        let snapshot_source: Arc<dyn SnapshotSource> = match snapshot_file {
            Some(path) => Arc::new(CachedSnapshotSource::new(
                SnapshotFileSource::new(path),
                config.snapshot_cache_ttl,
            )),
            None => Arc::new(CachedSnapshotSource::new(
                SqliteSnapshotRepository::from_connection(conn.clone()),
                config.snapshot_cache_ttl,
            )),
        };
        tracing::info!(source = %snapshot_source.describe(), ttl_secs = config.snapshot_cache_ttl.as_secs(), "快照数据源就绪");

        let dashboard_api = Arc::new(DashboardApi::new(snapshot_source.clone(), &config));

        let invalidate_target = snapshot_source.clone();
        let stock_entry_api = Arc::new(
            StockEntryApi::new(Arc::new(DailyStockRepository::from_connection(conn)))
                .with_change_hook(Arc::new(move || invalidate_target.invalidate())),
        );

        Ok(Self {
            db_path,
            config,
            snapshot_source,
            dashboard_api,
            stock_entry_api,
        })
    }
}

/// 解析数据库路径
///
/// 优先级: 环境变量 STOCK_HEALTH_DB_PATH → 命令行参数 → 用户数据目录
pub fn resolve_db_path(cli_arg: Option<&str>) -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Some(arg) = cli_arg.map(str::trim).filter(|a| !a.is_empty()) {
        return arg.to_string();
    }

    get_default_db_path()
}

/// 默认数据库路径 (用户数据目录,取不到时回退到当前目录)
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./stock_health.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("stock-health-monitor");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("stock_health.db");
        }
    }

    path.to_string_lossy().to_string()
}
