// ==========================================
// 库存健康监控系统 - 快照文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 表头 + 原始行 (列名 → 文本值),不做类型转换
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始行 (行号按文件中的物理行计,表头为第 1 行)
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// 文件解析器接口
pub trait FileParser: Send + Sync {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedSheet>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn build_row(headers: &[String], values: impl Iterator<Item = String>, row_number: usize) -> Option<RawRow> {
    let mut row_map = HashMap::new();
    for (col_idx, value) in values.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            row_map.insert(header.clone(), value.trim().to_string());
        }
    }

    // 跳过完全空白的行
    if row_map.values().all(|v| v.is_empty()) {
        return None;
    }

    Some(RawRow {
        row_number,
        values: row_map,
    })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            if let Some(row) = build_row(&headers, record.iter().map(str::to_string), idx + 2) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows_iter = range.rows();
        let header_row = match rows_iter.next() {
            Some(row) => row,
            None => return Ok(ParsedSheet::default()),
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, data_row) in rows_iter.enumerate() {
            if let Some(row) = build_row(&headers, data_row.iter().map(cell_text), idx + 2) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet { headers, rows })
    }
}

/// 单元格文本 (日期单元格转为 YYYY-MM-DD)
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Excel 日期序列号 → 日期 (1900 日期系统)
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse(file_path),
            "xlsx" | "xls" => ExcelParser.parse(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_parser_skips_blank_rows_and_keeps_line_numbers() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Location, Item ,Date").unwrap();
        writeln!(temp_file, "Delhi,Gauze,2025-03-01").unwrap();
        writeln!(temp_file, ",,").unwrap();
        writeln!(temp_file, "Pune,Masks,2025-03-01").unwrap();
        temp_file.flush().unwrap();

        let sheet = CsvParser.parse(temp_file.path()).unwrap();
        assert_eq!(sheet.headers, vec!["Location", "Item", "Date"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].row_number, 4);
        assert_eq!(sheet.rows[1].values.get("Item").map(String::as_str), Some("Masks"));
    }

    #[test]
    fn test_missing_file() {
        let err = UniversalFileParser
            .parse(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let err = UniversalFileParser.parse(temp_file.path()).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ext) if ext == "json"));
    }

    #[test]
    fn test_excel_serial_date() {
        assert_eq!(excel_serial_to_date(45717.0), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(excel_serial_to_date(0.0), None);
    }
}
