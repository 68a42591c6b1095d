// ==========================================
// 库存健康监控系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// 规则: 表或键不存在时回退默认值;值无法解析时告警并回退默认值
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::db::{open_sqlite_connection, table_exists};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        if !table_exists(&conn, "config_kv")? {
            return Ok(None);
        }

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（upsert）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 全部 global 配置 (按键排序)
    pub fn list_global_config(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        if !table_exists(&conn, "config_kv")? {
            return Ok(BTreeMap::new());
        }

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 读取并解析配置值,解析失败时回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, value = %raw, "配置值无法解析,使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 快照缓存有效期
    pub fn get_snapshot_cache_ttl(&self) -> Result<Duration, Box<dyn Error>> {
        let secs = self.get_parsed_or_default(
            config_keys::SNAPSHOT_CACHE_TTL_SECS,
            EngineConfig::default().snapshot_cache_ttl.as_secs(),
        )?;
        Ok(Duration::from_secs(secs))
    }

    /// 重点提示条数
    pub fn get_top_critical_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::TOP_CRITICAL_LIMIT,
            EngineConfig::default().top_critical_limit,
        )
    }

    /// 补货清单导出目录
    pub fn get_export_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::EXPORT_DIR)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| EngineConfig::default().export_dir))
    }

    /// 组装引擎配置
    pub fn load_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        let config = EngineConfig {
            snapshot_cache_ttl: self.get_snapshot_cache_ttl()?,
            top_critical_limit: self.get_top_critical_limit()?,
            export_dir: self.get_export_dir()?,
        };
        tracing::debug!(?config, "引擎配置加载完成");
        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 快照缓存
    pub const SNAPSHOT_CACHE_TTL_SECS: &str = "snapshot_cache_ttl_secs";

    // 告警
    pub const TOP_CRITICAL_LIMIT: &str = "top_critical_limit";

    // 导出
    pub const EXPORT_DIR: &str = "export_dir";
}
