// ==========================================
// 库存健康监控系统 - SQLite 快照仓储
// ==========================================
// 数据源: stock_health_metrics (表或视图)
// 读取: 解析后日期最大的全部行,按 location, item 排序
// 日期为空的行保留到校验阶段,整份快照报错
// 红线: Repository 不含业务逻辑
// 红线: 固定 schema,缺列即加载失败,不做按位置猜列
// ==========================================

use crate::db::{open_sqlite_connection, table_columns, table_exists};
use crate::domain::snapshot::{parse_snapshot_date, RawSnapshotRecord, Snapshot};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::snapshot_source::SnapshotSource;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use std::sync::{Arc, Mutex};

/// 快照表/视图名
pub const SNAPSHOT_VIEW: &str = "stock_health_metrics";

/// 快照必需列 (上游的 days_until_stockout / stock_status 列不读取)
pub const REQUIRED_SNAPSHOT_COLUMNS: [&str; 9] = [
    "location",
    "item",
    "date",
    "closing_stock",
    "issued",
    "avg_daily_usage",
    "lead_time_days",
    "reorder_level",
    "suggested_reorder_qty",
];

// ==========================================
// SqliteSnapshotRepository - 快照仓储
// ==========================================
pub struct SqliteSnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSnapshotRepository {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 校验快照表存在且包含全部必需列
    fn ensure_schema(conn: &Connection) -> RepositoryResult<()> {
        if !table_exists(conn, SNAPSHOT_VIEW)? {
            return Err(RepositoryError::SourceMissing(format!(
                "表或视图 {} 不存在",
                SNAPSHOT_VIEW
            )));
        }

        let columns = table_columns(conn, SNAPSHOT_VIEW)?;
        let missing: Vec<String> = REQUIRED_SNAPSHOT_COLUMNS
            .iter()
            .filter(|c| !columns.iter().any(|col| col == *c))
            .map(|c| c.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(RepositoryError::SchemaMismatch {
                source_name: SNAPSHOT_VIEW.to_string(),
                missing,
            });
        }
        Ok(())
    }

    /// 读取最新日期的暂存记录 (未校验)
    ///
    /// 日期在 Rust 侧解析后再取最大值: 表中可能混用 YYYY-MM-DD 与 YYYYMMDD,
    /// 按文本比较会把同一天拆成两份快照。日期为空的行保留,由校验拒绝。
    /// 行号为按 location, item 排序读取时的序号。
    pub fn fetch_latest_records(&self) -> RepositoryResult<Vec<RawSnapshotRecord>> {
        let conn = self.get_conn()?;
        Self::ensure_schema(&conn)?;

        let sql = format!(
            r#"
            SELECT {columns}
            FROM {view}
            ORDER BY location, item
            "#,
            columns = REQUIRED_SNAPSHOT_COLUMNS.join(", "),
            view = SNAPSHOT_VIEW,
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut records = Vec::new();
        let mut row_number = 0usize;
        while let Some(row) = rows.next()? {
            row_number += 1;
            records.push(map_record(row, row_number)?);
        }

        let total_rows = records.len();
        let latest = records.iter().filter_map(|r| r.date).max();
        let selected: Vec<RawSnapshotRecord> = records
            .into_iter()
            .filter(|r| r.date.is_none() || r.date == latest)
            .collect();

        tracing::debug!(
            source = SNAPSHOT_VIEW,
            total_rows,
            latest_rows = selected.len(),
            "快照表读取完成"
        );
        Ok(selected)
    }
}

impl SnapshotSource for SqliteSnapshotRepository {
    fn fetch_latest_snapshot(&self) -> RepositoryResult<Arc<Snapshot>> {
        let records = self.fetch_latest_records()?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push(record.validate()?);
        }

        let snapshot = Snapshot::from_rows(rows);
        tracing::info!(
            source = SNAPSHOT_VIEW,
            date = ?snapshot.date,
            rows = snapshot.len(),
            "快照加载完成"
        );
        Ok(Arc::new(snapshot))
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", SNAPSHOT_VIEW)
    }
}

// ==========================================
// 行映射: 列值 → 暂存记录
// ==========================================
// 列值类型不符 (如文本写进数量列) 直接报行格式错误

fn map_record(row: &Row<'_>, row_number: usize) -> RepositoryResult<RawSnapshotRecord> {
    let date_text = read_text(row, 2, "date", row_number)?;
    let date = match date_text {
        None => None,
        Some(text) => Some(parse_snapshot_date(&text).ok_or_else(|| RepositoryError::MalformedRow {
            row: row_number,
            field: "date".to_string(),
            message: format!("无法解析日期: {}", text),
        })?),
    };

    Ok(RawSnapshotRecord {
        location: read_text(row, 0, "location", row_number)?,
        item: read_text(row, 1, "item", row_number)?,
        date,
        closing_stock: read_integer(row, 3, "closing_stock", row_number)?,
        issued: read_integer(row, 4, "issued", row_number)?,
        avg_daily_usage: read_real(row, 5, "avg_daily_usage", row_number)?,
        lead_time_days: read_integer(row, 6, "lead_time_days", row_number)?,
        reorder_level: read_integer(row, 7, "reorder_level", row_number)?,
        suggested_reorder_qty: read_integer(row, 8, "suggested_reorder_qty", row_number)?,
        row_number,
    })
}

fn type_error(row_number: usize, field: &str, expected: &str) -> RepositoryError {
    RepositoryError::MalformedRow {
        row: row_number,
        field: field.to_string(),
        message: format!("类型错误, 期望{}", expected),
    }
}

fn read_text(row: &Row<'_>, idx: usize, field: &str, row_number: usize) -> RepositoryResult<Option<String>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(bytes) => Ok(Some(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Integer(v) => Ok(Some(v.to_string())),
        _ => Err(type_error(row_number, field, "文本")),
    }
}

fn read_integer(row: &Row<'_>, idx: usize, field: &str, row_number: usize) -> RepositoryResult<Option<i64>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(v) => Ok(Some(v)),
        // 上游视图的聚合列可能为 REAL,只接受整数值
        ValueRef::Real(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
        _ => Err(type_error(row_number, field, "整数")),
    }
}

fn read_real(row: &Row<'_>, idx: usize, field: &str, row_number: usize) -> RepositoryResult<Option<f64>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Real(v) => Ok(Some(v)),
        ValueRef::Integer(v) => Ok(Some(v as f64)),
        _ => Err(type_error(row_number, field, "数值")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn repo_with_schema() -> (SqliteSnapshotRepository, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (SqliteSnapshotRepository::from_connection(conn.clone()), conn)
    }

    fn insert(conn: &Arc<Mutex<Connection>>, sql: &str) {
        conn.lock().unwrap().execute_batch(sql).unwrap();
    }

    #[test]
    fn test_reads_only_latest_date_in_order() {
        let (repo, conn) = repo_with_schema();
        insert(
            &conn,
            r#"
            INSERT INTO stock_health_metrics
                (location, item, date, closing_stock, issued, avg_daily_usage,
                 days_until_stockout, stock_status, suggested_reorder_qty, lead_time_days, reorder_level)
            VALUES
                ('Pune', 'Masks', '2025-03-01', 50, 5, 5.0, 999.0, 'OVERSTOCK', 0, 3, 20),
                ('Delhi', 'Insulin', '2025-03-01', 4, 2, 2.0, NULL, NULL, 30, 7, 10),
                ('Delhi', 'Insulin', '2025-02-28', 6, 2, 2.0, NULL, NULL, 30, 7, 10);
            "#,
        );

        let snapshot = repo.fetch_latest_snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.rows[0].location, "Delhi");
        assert_eq!(snapshot.rows[1].location, "Pune");
        assert_eq!(snapshot.date, parse_snapshot_date("2025-03-01"));
    }

    #[test]
    fn test_empty_table_is_empty_snapshot() {
        let (repo, _conn) = repo_with_schema();
        let snapshot = repo.fetch_latest_snapshot().unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_missing_table_is_source_missing() {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let repo = SqliteSnapshotRepository::from_connection(conn);
        let err = repo.fetch_latest_snapshot().unwrap_err();
        assert!(matches!(err, RepositoryError::SourceMissing(_)));
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE stock_health_metrics (location TEXT, item TEXT, date TEXT, closing_stock INTEGER)",
        )
        .unwrap();
        let repo = SqliteSnapshotRepository::from_connection(Arc::new(Mutex::new(conn)));

        match repo.fetch_latest_snapshot().unwrap_err() {
            RepositoryError::SchemaMismatch { missing, .. } => {
                assert!(missing.contains(&"avg_daily_usage".to_string()));
                assert!(missing.contains(&"suggested_reorder_qty".to_string()));
                assert!(!missing.contains(&"item".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_null_field_fails_whole_snapshot() {
        let (repo, conn) = repo_with_schema();
        insert(
            &conn,
            r#"
            INSERT INTO stock_health_metrics
                (location, item, date, closing_stock, issued, avg_daily_usage,
                 suggested_reorder_qty, lead_time_days, reorder_level)
            VALUES
                ('Delhi', 'Insulin', '2025-03-01', 4, 2, 2.0, 30, 7, 10),
                ('Pune', 'Masks', '2025-03-01', 50, 5, 5.0, NULL, 3, 20);
            "#,
        );

        match repo.fetch_latest_snapshot().unwrap_err() {
            RepositoryError::MalformedRow { row, field, .. } => {
                assert_eq!(row, 2);
                assert_eq!(field, "suggested_reorder_qty");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_text_in_numeric_column_is_malformed() {
        let (repo, conn) = repo_with_schema();
        insert(
            &conn,
            r#"
            INSERT INTO stock_health_metrics
                (location, item, date, closing_stock, issued, avg_daily_usage,
                 suggested_reorder_qty, lead_time_days, reorder_level)
            VALUES ('Delhi', 'Insulin', '2025-03-01', 'many', 2, 2.0, 30, 7, 10);
            "#,
        );

        let err = repo.fetch_latest_snapshot().unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedRow { ref field, .. } if field == "closing_stock"));
    }

    #[test]
    fn test_compact_and_iso_dates_form_one_snapshot() {
        let (repo, conn) = repo_with_schema();
        insert(
            &conn,
            r#"
            INSERT INTO stock_health_metrics
                (location, item, date, closing_stock, issued, avg_daily_usage,
                 suggested_reorder_qty, lead_time_days, reorder_level)
            VALUES
                ('Delhi', 'Insulin', '2025-03-01', 4, 2, 2.0, 30, 7, 10),
                ('Pune', 'Masks', '2025-03-01', 50, 5, 5.0, 0, 3, 20),
                ('Mumbai', 'Gauze', '20250301', 8, 1, 1.0, 0, 3, 20),
                ('Mumbai', 'Gauze', '20250228', 9, 1, 1.0, 0, 3, 20);
            "#,
        );

        let snapshot = repo.fetch_latest_snapshot().unwrap();
        let locations: Vec<&str> = snapshot.rows.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["Delhi", "Mumbai", "Pune"]);
        assert_eq!(snapshot.date, parse_snapshot_date("2025-03-01"));
    }

    #[test]
    fn test_null_date_fails_whole_snapshot() {
        let (repo, conn) = repo_with_schema();
        insert(
            &conn,
            r#"
            INSERT INTO stock_health_metrics
                (location, item, date, closing_stock, issued, avg_daily_usage,
                 suggested_reorder_qty, lead_time_days, reorder_level)
            VALUES
                ('Delhi', 'Insulin', '2025-03-01', 4, 2, 2.0, 30, 7, 10),
                ('Pune', 'Masks', NULL, 50, 5, 5.0, 0, 3, 20);
            "#,
        );

        match repo.fetch_latest_snapshot().unwrap_err() {
            RepositoryError::MalformedRow { row, field, .. } => {
                assert_eq!(row, 2);
                assert_eq!(field, "date");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
