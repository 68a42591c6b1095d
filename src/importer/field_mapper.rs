// ==========================================
// 库存健康监控系统 - 快照字段映射器
// ==========================================
// 职责: 表头 → 固定 schema 列 + 文本 → 类型转换
// 规则: 表头不区分大小写、忽略首尾空白;缺列直接拒绝,不按位置猜列
// ==========================================

use crate::domain::snapshot::{parse_snapshot_date, RawSnapshotRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use crate::repository::snapshot_repo::REQUIRED_SNAPSHOT_COLUMNS;
use std::collections::HashMap;

/// 快照字段映射器
///
/// 由文件表头构造,保存"规范列名 → 文件原始列名"的对应关系
#[derive(Debug, Clone)]
pub struct SnapshotFieldMapper {
    columns: HashMap<&'static str, String>,
}

impl SnapshotFieldMapper {
    /// 按表头构造映射,缺少任一必需列即失败
    pub fn from_headers(headers: &[String]) -> ImportResult<Self> {
        let mut columns = HashMap::new();
        let mut missing = Vec::new();

        for required in REQUIRED_SNAPSHOT_COLUMNS {
            match headers
                .iter()
                .find(|h| h.trim().eq_ignore_ascii_case(required))
            {
                Some(header) => {
                    columns.insert(required, header.clone());
                }
                None => missing.push(required.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns { columns: missing });
        }
        Ok(Self { columns })
    }

    /// 原始行 → 暂存记录 (缺失值保留为 None,交由校验统一拒绝)
    pub fn map_row(&self, row: &RawRow) -> ImportResult<RawSnapshotRecord> {
        Ok(RawSnapshotRecord {
            location: self.get_string(row, "location"),
            item: self.get_string(row, "item"),
            date: self.parse_date(row, "date")?,
            closing_stock: self.parse_i64(row, "closing_stock")?,
            issued: self.parse_i64(row, "issued")?,
            avg_daily_usage: self.parse_f64(row, "avg_daily_usage")?,
            lead_time_days: self.parse_i64(row, "lead_time_days")?,
            reorder_level: self.parse_i64(row, "reorder_level")?,
            suggested_reorder_qty: self.parse_i64(row, "suggested_reorder_qty")?,
            row_number: row.row_number,
        })
    }

    fn get_string(&self, row: &RawRow, field: &str) -> Option<String> {
        self.columns
            .get(field)
            .and_then(|header| row.values.get(header))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn malformed(row: &RawRow, field: &str, message: String) -> ImportError {
        ImportError::MalformedRow {
            row: row.row_number,
            field: field.to_string(),
            message,
        }
    }

    fn parse_f64(&self, row: &RawRow, field: &str) -> ImportResult<Option<f64>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| Self::malformed(row, field, format!("无法解析为数值: {}", value))),
        }
    }

    /// 整数列 (接受 "40" 与 Excel 导出的 "40.0")
    fn parse_i64(&self, row: &RawRow, field: &str) -> ImportResult<Option<i64>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => {
                if let Ok(v) = value.parse::<i64>() {
                    return Ok(Some(v));
                }
                match value.parse::<f64>() {
                    Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
                    _ => Err(Self::malformed(row, field, format!("无法解析为整数: {}", value))),
                }
            }
        }
    }

    fn parse_date(&self, row: &RawRow, field: &str) -> ImportResult<Option<chrono::NaiveDate>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => parse_snapshot_date(&value).map(Some).ok_or_else(|| {
                Self::malformed(
                    row,
                    field,
                    format!("日期格式错误, 期望 YYYY-MM-DD 或 YYYYMMDD, 实际 {}", value),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        [
            "Location",
            "ITEM",
            "date",
            "Closing_Stock",
            "issued",
            "avg_daily_usage",
            "lead_time_days",
            "reorder_level",
            "suggested_reorder_qty",
            "stock_status",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn raw_row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number: 2,
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let mapper = SnapshotFieldMapper::from_headers(&headers()).unwrap();
        let record = mapper
            .map_row(&raw_row(&[
                ("Location", "Delhi"),
                ("ITEM", "Gauze"),
                ("date", "20250301"),
                ("Closing_Stock", "40.0"),
                ("issued", "3"),
                ("avg_daily_usage", "2.5"),
                ("lead_time_days", "7"),
                ("reorder_level", "10"),
                ("suggested_reorder_qty", "0"),
            ]))
            .unwrap();

        assert_eq!(record.location.as_deref(), Some("Delhi"));
        assert_eq!(record.closing_stock, Some(40));
        assert_eq!(record.avg_daily_usage, Some(2.5));
        assert_eq!(record.date, chrono::NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let short: Vec<String> = vec!["location".to_string(), "item".to_string()];
        match SnapshotFieldMapper::from_headers(&short).unwrap_err() {
            ImportError::MissingColumns { columns } => {
                assert_eq!(columns.len(), 7);
                assert!(columns.contains(&"date".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_number_is_malformed() {
        let mapper = SnapshotFieldMapper::from_headers(&headers()).unwrap();
        let err = mapper
            .map_row(&raw_row(&[("Closing_Stock", "4.5")]))
            .unwrap_err();
        assert!(matches!(err, ImportError::MalformedRow { ref field, .. } if field == "closing_stock"));
    }

    #[test]
    fn test_blank_cell_is_absent_not_zero() {
        let mapper = SnapshotFieldMapper::from_headers(&headers()).unwrap();
        let record = mapper.map_row(&raw_row(&[("issued", "  ")])).unwrap();
        assert_eq!(record.issued, None);
    }
}
