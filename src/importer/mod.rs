// ==========================================
// 库存健康监控系统 - 快照文件导入层
// ==========================================
// 职责: 外部快照文件 → 快照
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod snapshot_file_source;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::SnapshotFieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, ParsedSheet, RawRow, UniversalFileParser};
pub use snapshot_file_source::SnapshotFileSource;
