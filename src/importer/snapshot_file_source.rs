// ==========================================
// 库存健康监控系统 - 文件快照数据源
// ==========================================
// 流程: 解析文件 → 表头映射 → 类型转换 → 取最新日期 → 行校验
// 红线: 任一行缺失/越界 → 整份快照失败
// ==========================================

use crate::domain::snapshot::{RawSnapshotRecord, Snapshot};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::SnapshotFieldMapper;
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::repository::error::RepositoryResult;
use crate::repository::snapshot_source::SnapshotSource;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct SnapshotFileSource {
    path: PathBuf,
}

impl SnapshotFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取最新日期的暂存记录
    ///
    /// 日期缺失的行同样保留,在校验阶段报错
    pub fn read_latest_records(&self) -> ImportResult<Vec<RawSnapshotRecord>> {
        let sheet = UniversalFileParser.parse(&self.path)?;
        let mapper = SnapshotFieldMapper::from_headers(&sheet.headers)?;

        let records = sheet
            .rows
            .iter()
            .map(|row| mapper.map_row(row))
            .collect::<ImportResult<Vec<_>>>()?;

        let latest = records.iter().filter_map(|r| r.date).max();
        let mut selected: Vec<RawSnapshotRecord> = records
            .into_iter()
            .filter(|r| r.date.is_none() || r.date == latest)
            .collect();

        // 与 SQLite 数据源保持同一顺序
        selected.sort_by(|a, b| (&a.location, &a.item).cmp(&(&b.location, &b.item)));

        tracing::debug!(
            path = %self.path.display(),
            total_rows = sheet.rows.len(),
            latest_rows = selected.len(),
            "快照文件解析完成"
        );
        Ok(selected)
    }
}

impl SnapshotSource for SnapshotFileSource {
    fn fetch_latest_snapshot(&self) -> RepositoryResult<Arc<Snapshot>> {
        let records = self.read_latest_records()?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push(record.validate()?);
        }

        let snapshot = Snapshot::from_rows(rows);
        tracing::info!(
            source = %self.path.display(),
            date = ?snapshot.date,
            rows = snapshot.len(),
            "快照加载完成"
        );
        Ok(Arc::new(snapshot))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
