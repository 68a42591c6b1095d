// ==========================================
// 库存健康监控系统 - 每日库存原始记录仓储
// ==========================================
// 表: daily_stock, 主键 (date, location, item)
// 红线: Repository 不含业务逻辑 (期末库存推导与校验在 API 层)
// 约束: 所有语句参数化,名称中的引号等字符原样入库
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::stock_entry::{DailyStockEntry, StockEntryKey};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

/// 最近记录默认条数
pub const DEFAULT_RECENT_LIMIT: usize = 50;

const ENTRY_COLUMNS: &str = "date, location, item, opening_stock, received, issued, \
                             closing_stock, lead_time_days, reorder_level";

// ==========================================
// DailyStockRepository
// ==========================================
pub struct DailyStockRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DailyStockRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增记录
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): 同一 (date, location, item) 已存在
    pub fn insert(&self, entry: &DailyStockEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO daily_stock (
                date, location, item,
                opening_stock, received, issued, closing_stock,
                lead_time_days, reorder_level
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                entry.date.to_string(),
                entry.location,
                entry.item,
                entry.opening_stock,
                entry.received,
                entry.issued,
                entry.closing_stock,
                entry.lead_time_days,
                entry.reorder_level,
            ],
        )?;
        Ok(())
    }

    /// 按主键更新数量字段
    ///
    /// # 返回
    /// - Err(NotFound): 主键不存在
    pub fn update(&self, entry: &DailyStockEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE daily_stock
            SET opening_stock = ?4,
                received = ?5,
                issued = ?6,
                closing_stock = ?7,
                lead_time_days = ?8,
                reorder_level = ?9
            WHERE date = ?1 AND location = ?2 AND item = ?3
            "#,
            params![
                entry.date.to_string(),
                entry.location,
                entry.item,
                entry.opening_stock,
                entry.received,
                entry.issued,
                entry.closing_stock,
                entry.lead_time_days,
                entry.reorder_level,
            ],
        )?;

        if affected == 0 {
            return Err(not_found(&entry.key()));
        }
        Ok(())
    }

    /// 按主键删除
    ///
    /// # 返回
    /// - Err(NotFound): 主键不存在
    pub fn delete(&self, key: &StockEntryKey) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM daily_stock WHERE date = ?1 AND location = ?2 AND item = ?3",
            params![key.date.to_string(), key.location, key.item],
        )?;

        if affected == 0 {
            return Err(not_found(key));
        }
        Ok(())
    }

    /// 按主键查询
    pub fn find(&self, key: &StockEntryKey) -> RepositoryResult<Option<DailyStockEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM daily_stock WHERE date = ?1 AND location = ?2 AND item = ?3",
            ENTRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row(
            params![key.date.to_string(), key.location, key.item],
            map_entry,
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 最近记录 (日期倒序, 同日按 location, item)
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<DailyStockEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM daily_stock ORDER BY date DESC, location, item LIMIT ?1",
            ENTRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map(params![limit], map_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn not_found(key: &StockEntryKey) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "daily_stock".to_string(),
        id: format!("{}/{}/{}", key.date, key.location, key.item),
    }
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<DailyStockEntry> {
    let date_text: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(DailyStockEntry {
        date,
        location: row.get(1)?,
        item: row.get(2)?,
        opening_stock: row.get(3)?,
        received: row.get(4)?,
        issued: row.get(5)?,
        closing_stock: row.get(6)?,
        lead_time_days: row.get(7)?,
        reorder_level: row.get(8)?,
    })
}
