// ==========================================
// 设备台账分类汇总 - 文件解析器实现
// ==========================================
// 职责: 文件 → Workbook（有序工作表,首行为暂定列名）
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls/.ods) / CSV (.csv)
// ==========================================

use crate::domain::{unnamed_label, CellValue, RawRow, RawTable, SheetData, SourceGrid, Workbook};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ==========================================
// WorkbookParser Trait
// ==========================================
pub trait WorkbookParser {
    /// 解析文件为工作簿
    ///
    /// # 返回
    /// - Ok(Workbook): 工作表顺序与文件一致
    /// - Err(ImportError): 文件不存在/格式不支持/解析失败
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Workbook>;
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

/// 首行 → 列名（空白 → `Unnamed: N`）
fn header_labels(header: &[CellValue]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let label = cell.display_text().trim().to_string();
            if label.is_empty() {
                unnamed_label(idx)
            } else {
                label
            }
        })
        .collect()
}

/// 首行作列名,其余为数据行
fn table_from_grid(mut grid: Vec<RawRow>) -> RawTable {
    if grid.is_empty() {
        return RawTable::default();
    }
    let header = grid.remove(0);
    RawTable::new(header_labels(&header), grid)
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::String(s) if s.is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            // 日期/错误值按显示文本保留
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl WorkbookParser for ExcelParser {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Workbook> {
        let path = file_path;

        // 检查文件存在
        ensure_exists(path)?;

        // 检查扩展名
        let ext = extension_of(path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开工作簿（格式自动识别）
        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::EmptyWorkbook(path.display().to_string()));
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = workbook.worksheet_range(&name)?;

            // 区域不一定从 A1 开始: 原样网格记录起点,表格补齐前导空列以保持列位置
            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            let cells: Vec<RawRow> = range
                .rows()
                .map(|row| row.iter().map(Self::convert_cell).collect())
                .collect();
            let grid: Vec<RawRow> = cells
                .iter()
                .map(|row| {
                    std::iter::repeat(CellValue::Empty)
                        .take(start_col as usize)
                        .chain(row.iter().cloned())
                        .collect()
                })
                .collect();

            let table = table_from_grid(grid);
            debug!(
                sheet = %name,
                columns = table.width(),
                rows = table.height(),
                start_row,
                start_col,
                "工作表读取完成"
            );
            let source = SourceGrid::new(start_row, start_col as u16, cells);
            sheets.push(SheetData::with_source(name, table, source));
        }

        info!(file = %path.display(), sheets = sheets.len(), "Excel 工作簿读取完成");
        Ok(Workbook::new(sheets))
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
// 单表,表名取文件名（不含扩展名）
pub struct CsvParser;

impl CsvParser {
    fn convert_field(field: &str) -> CellValue {
        if field.is_empty() {
            return CellValue::Empty;
        }
        let trimmed = field.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
        CellValue::Text(field.to_string())
    }
}

impl WorkbookParser for CsvParser {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Workbook> {
        let path = file_path;

        // 检查文件存在
        ensure_exists(path)?;

        // 检查扩展名
        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开 CSV 文件（表头作为普通行读取,由 table_from_grid 提升）
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut grid: Vec<RawRow> = Vec::new();
        for result in reader.records() {
            let record = result?;
            grid.push(record.iter().map(Self::convert_field).collect());
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Sheet1".to_string());
        let source = SourceGrid::new(0, 0, grid.clone());
        let table = table_from_grid(grid);

        info!(file = %path.display(), rows = table.height(), "CSV 文件读取完成");
        Ok(Workbook::new(vec![SheetData::with_source(name, table, source)]))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Workbook> {
        let path = file_path.as_ref();
        let ext = extension_of(path);

        match ext.as_str() {
            "csv" => CsvParser.parse_workbook(path),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelParser.parse_workbook(path),
            _ => {
                ensure_exists(path)?;
                Err(ImportError::UnsupportedFormat(ext))
            }
        }
    }
}
