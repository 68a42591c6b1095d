// ==========================================
// 库存健康监控系统 - 快照缓存
// ==========================================
// 职责: 快照加载的 TTL 记忆化
// 规则:
// - now - fetched_at < ttl 时命中
// - 加载失败不缓存
// - invalidate() 显式丢弃 (原始记录变更后调用)
// ==========================================

use crate::domain::snapshot::Snapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::snapshot_source::SnapshotSource;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// 默认缓存有效期 (秒)
pub const DEFAULT_SNAPSHOT_TTL_SECS: u64 = 600;

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: Arc<Snapshot>,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < self.ttl
    }
}

// ==========================================
// CachedSnapshotSource - 带缓存的快照数据源
// ==========================================
pub struct CachedSnapshotSource<S: SnapshotSource> {
    inner: S,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl<S: SnapshotSource> CachedSnapshotSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// 读取快照 (共享只读)
    pub fn load(&self) -> RepositoryResult<Arc<Snapshot>> {
        self.load_at(Instant::now())
    }

    /// 以给定时刻判断新鲜度并读取快照
    pub fn load_at(&self, now: Instant) -> RepositoryResult<Arc<Snapshot>> {
        let mut entry = self
            .entry
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(now) {
                tracing::debug!(source = %self.inner.describe(), "快照缓存命中");
                return Ok(cached.snapshot.clone());
            }
        }

        // 失败直接返回,旧条目同时作废
        *entry = None;
        let snapshot = self.inner.fetch_latest_snapshot()?;
        *entry = Some(CacheEntry {
            snapshot: snapshot.clone(),
            fetched_at: now,
            ttl: self.ttl,
        });
        Ok(snapshot)
    }

    /// 丢弃缓存条目
    pub fn invalidate(&self) {
        if let Ok(mut entry) = self.entry.lock() {
            if entry.take().is_some() {
                tracing::debug!(source = %self.inner.describe(), "快照缓存已失效");
            }
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SnapshotSource> SnapshotSource for CachedSnapshotSource<S> {
    fn fetch_latest_snapshot(&self) -> RepositoryResult<Arc<Snapshot>> {
        self.load()
    }

    fn invalidate(&self) {
        CachedSnapshotSource::invalidate(self)
    }

    fn describe(&self) -> String {
        format!("cached({})", self.inner.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    impl SnapshotSource for CountingSource {
        fn fetch_latest_snapshot(&self) -> RepositoryResult<Arc<Snapshot>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(RepositoryError::SourceMissing("stock_health_metrics".to_string()));
            }
            Ok(Arc::new(Snapshot::empty()))
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn cache() -> CachedSnapshotSource<CountingSource> {
        CachedSnapshotSource::new(CountingSource::new(), Duration::from_secs(600))
    }

    #[test]
    fn test_fresh_entry_is_reused() {
        let cache = cache();
        let t0 = Instant::now();
        cache.load_at(t0).unwrap();
        cache.load_at(t0 + Duration::from_secs(599)).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_expired_entry_is_refetched() {
        let cache = cache();
        let t0 = Instant::now();
        cache.load_at(t0).unwrap();
        cache.load_at(t0 + Duration::from_secs(600)).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let cache = cache();
        let t0 = Instant::now();
        cache.load_at(t0).unwrap();
        cache.invalidate();
        cache.load_at(t0).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = cache();
        let t0 = Instant::now();
        cache.inner().fail.store(true, Ordering::SeqCst);
        assert!(cache.load_at(t0).is_err());

        cache.inner().fail.store(false, Ordering::SeqCst);
        assert!(cache.load_at(t0).is_ok());
        cache.load_at(t0).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cached_snapshot_is_shared_not_copied() {
        let cache = cache();
        let first = cache.fetch_latest_snapshot().unwrap();
        let second = cache.fetch_latest_snapshot().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);
    }
}
