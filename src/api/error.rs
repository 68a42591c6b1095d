// ==========================================
// 库存健康监控系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/Engine错误为用户可读的错误消息
// 分类: 加载失败 (阻断) / 行格式错误 (整份快照失败) / 输入校验 / 数据访问
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 快照加载
    // ==========================================
    #[error("库存快照加载失败: {0}")]
    LoadFailure(String),

    #[error("库存快照存在格式错误的行 (行 {row}, 字段 {field}): {message}")]
    MalformedRow {
        row: usize,
        field: String,
        message: String,
    },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("补货清单导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 加载失败
            RepositoryError::SourceMissing(msg) => {
                ApiError::LoadFailure(format!("数据源不存在: {}", msg))
            }
            RepositoryError::SchemaMismatch {
                source_name,
                missing,
            } => ApiError::LoadFailure(format!(
                "数据源 {} 缺少必需列: {}",
                source_name,
                missing.join(", ")
            )),
            RepositoryError::FileSourceError(msg) => ApiError::LoadFailure(msg),
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),

            // 行格式错误
            RepositoryError::MalformedRow {
                row,
                field,
                message,
            } => ApiError::MalformedRow {
                row,
                field,
                message,
            },

            // 写入相关
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("记录已存在: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ExportError(msg) => ApiError::ExportError(msg),
            EngineError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl ApiError {
    /// 是否为阻断性的加载失败 (驾驶舱不做任何部分计算)
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            ApiError::LoadFailure(_) | ApiError::DatabaseConnectionError(_) | ApiError::DatabaseError(_)
        )
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
