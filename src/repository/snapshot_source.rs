// ==========================================
// 库存健康监控系统 - 快照数据源 Trait
// ==========================================
// 职责: 定义"取最新一份快照"的唯一能力
// 实现: SqliteSnapshotRepository / SnapshotFileSource / CachedSnapshotSource
// ==========================================

use crate::domain::snapshot::Snapshot;
use crate::repository::error::RepositoryResult;
use std::sync::Arc;

/// 快照数据源
///
/// 显式注入到驾驶舱 API,不使用模块级单例
pub trait SnapshotSource: Send + Sync {
    /// 读取最新日期的完整快照
    ///
    /// # 返回
    /// - Ok(Arc<Snapshot>): 共享只读快照,可能为空 (非致命)
    /// - Err: 加载失败 / 行格式错误 (整份快照失败)
    fn fetch_latest_snapshot(&self) -> RepositoryResult<Arc<Snapshot>>;

    /// 丢弃已缓存的快照 (无缓存的数据源为空操作)
    fn invalidate(&self) {}

    /// 数据源描述 (日志用)
    fn describe(&self) -> String;
}
