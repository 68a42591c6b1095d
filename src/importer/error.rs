// ==========================================
// 库存健康监控系统 - 快照文件导入错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表头与行 =====
    #[error("缺少必需列: {columns:?}")]
    MissingColumns { columns: Vec<String> },

    #[error("行格式错误 (行 {row}, 字段 {field}): {message}")]
    MalformedRow {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 文件数据源对外统一为仓储层错误
impl From<ImportError> for RepositoryError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => RepositoryError::SourceMissing(path),
            ImportError::MissingColumns { columns } => RepositoryError::SchemaMismatch {
                source_name: "snapshot file".to_string(),
                missing: columns,
            },
            ImportError::MalformedRow {
                row,
                field,
                message,
            } => RepositoryError::MalformedRow {
                row,
                field,
                message,
            },
            ImportError::Other(e) => RepositoryError::Other(e),
            other => RepositoryError::FileSourceError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
