// ==========================================
// 库存健康监控系统 - 驾驶舱 API
// ==========================================
// 职责: 加载快照 → 执行风险分级流水线 → 提供各视图
// 架构: API 层 → SnapshotSource (可带缓存) → Engine 层
// 红线: 加载失败时不做任何部分计算
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineConfig;
use crate::domain::snapshot::Snapshot;
use crate::engine::alert_prioritizer::AlertReport;
use crate::engine::key_metrics::KeyMetrics;
use crate::engine::pipeline::{StockHealthPipeline, StockHealthReport};
use crate::engine::reorder_list::{ReorderExport, ReorderReport};
use crate::engine::risk_matrix::RiskMatrix;
use crate::repository::snapshot_source::SnapshotSource;

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    source: Arc<dyn SnapshotSource>,
    pipeline: StockHealthPipeline,
    export_dir: PathBuf,
}

impl DashboardApi {
    /// 创建新的 DashboardApi 实例
    ///
    /// # 参数
    /// - source: 快照数据源 (通常为 CachedSnapshotSource)
    /// - config: 引擎配置 (重点提示条数、导出目录)
    pub fn new(source: Arc<dyn SnapshotSource>, config: &EngineConfig) -> Self {
        Self {
            source,
            pipeline: StockHealthPipeline::new(config.top_critical_limit),
            export_dir: config.export_dir.clone(),
        }
    }

    fn load_snapshot(&self) -> ApiResult<Arc<Snapshot>> {
        self.source.fetch_latest_snapshot().map_err(|e| {
            tracing::warn!(source = %self.source.describe(), error = %e, "快照加载失败");
            ApiError::from(e)
        })
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 完整驾驶舱结果
    pub fn get_report(&self) -> ApiResult<StockHealthReport> {
        let snapshot = self.load_snapshot()?;
        Ok(self.pipeline.run(&snapshot))
    }

    /// 丢弃缓存后重新计算
    pub fn refresh(&self) -> ApiResult<StockHealthReport> {
        self.source.invalidate();
        self.get_report()
    }

    pub fn get_key_metrics(&self) -> ApiResult<KeyMetrics> {
        Ok(self.get_report()?.metrics)
    }

    /// 风险矩阵 (物品 × 地点)
    pub fn get_risk_matrix(&self) -> ApiResult<RiskMatrix> {
        Ok(self.get_report()?.risk_matrix)
    }

    /// 告警列表 + 重点提示
    pub fn get_alerts(&self) -> ApiResult<AlertReport> {
        Ok(self.get_report()?.alerts)
    }

    /// 补货清单 + 汇总
    pub fn get_reorder_list(&self) -> ApiResult<ReorderReport> {
        Ok(self.get_report()?.reorders)
    }

    // ==========================================
    // 导出接口
    // ==========================================

    /// 生成补货清单导出内容
    ///
    /// # 返回
    /// - Ok(None): 无需补货,不产生导出文件
    pub fn export_reorder_list(&self, export_date: NaiveDate) -> ApiResult<Option<ReorderExport>> {
        let reorders = self.get_reorder_list()?;
        Ok(reorders.export_csv(export_date)?)
    }

    /// 将补货清单写入导出目录
    ///
    /// # 返回
    /// - Ok(Some(path)): 已写入的文件路径
    /// - Ok(None): 无需补货
    pub fn write_reorder_export(&self, export_date: NaiveDate) -> ApiResult<Option<PathBuf>> {
        match self.export_reorder_list(export_date)? {
            None => {
                tracing::info!("无需补货,跳过导出");
                Ok(None)
            }
            Some(export) => {
                let path = write_export(&self.export_dir, &export)?;
                tracing::info!(path = %path.display(), "补货清单已导出");
                Ok(Some(path))
            }
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

fn write_export(dir: &Path, export: &ReorderExport) -> ApiResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&export.file_name);
    std::fs::write(&path, export.content.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::StockSnapshotRow;
    use crate::engine::reorder_list::ReorderStatus;
    use crate::repository::error::{RepositoryError, RepositoryResult};

    struct FixedSource(RepositoryResult<Snapshot>);

    impl SnapshotSource for FixedSource {
        fn fetch_latest_snapshot(&self) -> RepositoryResult<Arc<Snapshot>> {
            match &self.0 {
                Ok(snapshot) => Ok(Arc::new(snapshot.clone())),
                Err(_) => Err(RepositoryError::SourceMissing("stock_health_metrics".to_string())),
            }
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    fn row(item: &str, closing_stock: i64, usage: f64, qty: i64) -> StockSnapshotRow {
        StockSnapshotRow {
            location: "Hospital_Mumbai".to_string(),
            item: item.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            closing_stock,
            issued: 0,
            avg_daily_usage: usage,
            lead_time_days: 5,
            reorder_level: 20,
            suggested_reorder_qty: qty,
        }
    }

    fn api(result: RepositoryResult<Snapshot>, export_dir: &Path) -> DashboardApi {
        let config = EngineConfig {
            export_dir: export_dir.to_path_buf(),
            ..Default::default()
        };
        DashboardApi::new(Arc::new(FixedSource(result)), &config)
    }

    #[test]
    fn test_load_failure_blocks_every_view() {
        let dir = tempfile::tempdir().unwrap();
        let api = api(
            Err(RepositoryError::SourceMissing("stock_health_metrics".to_string())),
            dir.path(),
        );
        assert!(api.get_report().unwrap_err().is_load_failure());
        assert!(api.get_risk_matrix().is_err());
        assert!(api.write_reorder_export(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).is_err());
    }

    #[test]
    fn test_write_export_to_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::from_rows(vec![row("Insulin", 4, 2.0, 80), row("Gauze", 100, 1.0, 0)]);
        let api = api(Ok(snapshot), dir.path());

        let path = api
            .write_reorder_export(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("reorder_list_20250302.csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("location,item,closing_stock"));
        assert!(content.contains("Hospital_Mumbai,Insulin,4,5,2.0,80,CRITICAL"));
    }

    #[test]
    fn test_no_reorders_means_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let api = api(Ok(Snapshot::from_rows(vec![row("Gauze", 100, 1.0, 0)])), dir.path());

        assert_eq!(api.get_reorder_list().unwrap().status(), ReorderStatus::NoReordersNeeded);
        assert_eq!(
            api.write_reorder_export(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()).unwrap(),
            None
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
