// ==========================================
// 库存健康监控系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类:
// - 加载失败: 连接/查询失败、表或视图缺失、必需列缺失
// - 行格式错误: 任一行字段缺失或越界 → 整份快照失败
// ==========================================

use crate::domain::snapshot::RowDefect;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 加载失败 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("数据源不存在: {0}")]
    SourceMissing(String),

    #[error("数据源缺少必需列 ({source_name}): {missing:?}")]
    SchemaMismatch {
        source_name: String,
        missing: Vec<String>,
    },

    #[error("快照文件读取失败: {0}")]
    FileSourceError(String),

    // ===== 行格式错误 =====
    #[error("行格式错误 (行 {row}, 字段 {field}): {message}")]
    MalformedRow {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 写入相关 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 是否属于"加载失败"类 (阻断,不做部分计算)
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            RepositoryError::DatabaseConnectionError(_)
                | RepositoryError::LockError(_)
                | RepositoryError::DatabaseQueryError(_)
                | RepositoryError::SourceMissing(_)
                | RepositoryError::SchemaMismatch { .. }
                | RepositoryError::FileSourceError(_)
        )
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("no such table") {
                    RepositoryError::SourceMissing(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::SqliteFailure(code, None)
                if code.code == rusqlite::ErrorCode::CannotOpen =>
            {
                RepositoryError::DatabaseConnectionError(err.to_string())
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

// 实现 From<RowDefect>
impl From<RowDefect> for RepositoryError {
    fn from(defect: RowDefect) -> Self {
        RepositoryError::MalformedRow {
            row: defect.row_number,
            field: defect.field.to_string(),
            message: defect.message,
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_maps_to_source_missing() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: RepositoryError = conn
            .prepare("SELECT * FROM stock_health_metrics")
            .unwrap_err()
            .into();
        assert!(matches!(err, RepositoryError::SourceMissing(_)));
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_row_defect_maps_to_malformed_row() {
        let err: RepositoryError = RowDefect {
            row_number: 7,
            field: "lead_time_days",
            message: "缺失".to_string(),
        }
        .into();
        match err {
            RepositoryError::MalformedRow { row, field, .. } => {
                assert_eq!(row, 7);
                assert_eq!(field, "lead_time_days");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
