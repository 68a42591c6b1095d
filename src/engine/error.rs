// ==========================================
// 库存健康监控系统 - 引擎层错误类型
// ==========================================
// 说明: 计算/分级均为全函数,此处只覆盖导出序列化
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("导出序列化失败: {0}")]
    ExportError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
