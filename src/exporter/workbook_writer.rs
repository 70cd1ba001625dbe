// ==========================================
// 设备台账分类汇总 - xlsx 写出器
// ==========================================
// 职责: 按输入顺序写出每张表; 表头加粗; 强调行加粗 + 下划线
// 透传表（排除/跳过）按导入时的原样网格写回,不加任何格式
// 说明: xlsx 不接受的表名会被修正（非法字符 → '_',截断 31 字符）
// ==========================================

use crate::domain::{CellValue, RawTable, SheetOutcome, SourceGrid};
use crate::exporter::error::{ExportError, ExportResult};
use rust_xlsxwriter::{Format, FormatUnderline, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// xlsx 表名最大长度
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

// ==========================================
// WorkbookWriter
// ==========================================
#[derive(Debug, Clone)]
pub struct WorkbookWriter {
    highlight_column: String,
}

impl WorkbookWriter {
    /// # 参数
    /// - highlight_column: 触发整行强调的列名（精确匹配）
    pub fn new(highlight_column: impl Into<String>) -> Self {
        Self {
            highlight_column: highlight_column.into(),
        }
    }

    /// 写出全部表到 path
    ///
    /// # 说明
    /// - 表顺序与 outcomes 一致
    /// - 排除表/跳过表按原样网格写出（位置、表头原文、空白表头均保留）
    pub fn write<P: AsRef<Path>>(&self, outcomes: &[SheetOutcome], path: P) -> ExportResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ExportError::OutputDirMissing(parent.display().to_string()));
            }
        }

        let header_format = Format::new().set_bold();
        let emphasis_format = Format::new()
            .set_bold()
            .set_underline(FormatUnderline::Single);
        let plain_format = Format::new();

        let mut workbook = Workbook::new();
        let mut used_names: HashSet<String> = HashSet::new();

        for (idx, outcome) in outcomes.iter().enumerate() {
            let name = unique_sheet_name(outcome.name(), idx, &mut used_names);
            if name != outcome.name() {
                warn!(original = outcome.name(), sanitized = %name, "表名不符合 xlsx 规则,已修正");
            }

            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&name)?;

            if let Some(source) = outcome.passthrough_source() {
                write_source(worksheet, source, &plain_format)?;
                debug!(sheet = %name, rows = source.rows.len(), "透传表原样写出");
                continue;
            }

            let table = outcome.output_table();
            let emphasized = self.write_table(
                worksheet,
                table,
                &header_format,
                &emphasis_format,
                &plain_format,
            )?;
            debug!(sheet = %name, rows = table.height(), emphasized, "工作表写出完成");
        }

        workbook.save(path)?;
        info!(file = %path.display(), sheets = outcomes.len(), "工作簿导出完成");
        Ok(())
    }

    /// 写出单张表,返回强调行数
    fn write_table(
        &self,
        worksheet: &mut Worksheet,
        table: &RawTable,
        header_format: &Format,
        emphasis_format: &Format,
        plain_format: &Format,
    ) -> ExportResult<usize> {
        // 表头
        for (col, label) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, label, header_format)?;
        }

        let highlight_col = table.column_index(&self.highlight_column);
        let mut emphasized = 0;

        for (row_idx, row) in table.rows.iter().enumerate() {
            let xlsx_row = (row_idx + 1) as u32;
            let emphasize = highlight_col
                .and_then(|col| row.get(col))
                .is_some_and(|cell| !cell.is_blank());
            let format = if emphasize {
                emphasized += 1;
                emphasis_format
            } else {
                plain_format
            };

            for (col, cell) in row.iter().enumerate() {
                write_cell(worksheet, xlsx_row, col as u16, cell, format)?;
            }
        }

        Ok(emphasized)
    }
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new("Customer Code")
    }
}

/// 原样网格写回原位置
fn write_source(ws: &mut Worksheet, source: &SourceGrid, format: &Format) -> ExportResult<()> {
    for (row_idx, row) in source.rows.iter().enumerate() {
        let xlsx_row = source.start_row + row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let xlsx_col = source.start_col + col_idx as u16;
            write_cell(ws, xlsx_row, xlsx_col, cell, format)?;
        }
    }
    Ok(())
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: &Format,
) -> ExportResult<()> {
    match cell {
        CellValue::Empty => { /* 空单元格不写 */ }
        CellValue::Text(s) => {
            ws.write_string_with_format(row, col, s, format)?;
        }
        CellValue::Int(i) => {
            ws.write_number_with_format(row, col, *i as f64, format)?;
        }
        CellValue::Float(f) => {
            ws.write_number_with_format(row, col, *f, format)?;
        }
        CellValue::Bool(b) => {
            ws.write_boolean_with_format(row, col, *b, format)?;
        }
    }
    Ok(())
}

/// 修正为 xlsx 可接受的表名
///
/// # 规则
/// - 非法字符 `[ ] : * ? / \` → '_'
/// - 去掉首尾单引号
/// - 截断到 31 字符
/// - 空名 → `Sheet<N>`（N 从 1 开始）
pub fn sanitize_sheet_name(name: &str, position: usize) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches('\'');
    let truncated: String = trimmed.chars().take(MAX_SHEET_NAME_LEN).collect();
    if truncated.trim().is_empty() {
        format!("Sheet{}", position + 1)
    } else {
        truncated
    }
}

/// 修正并去重（xlsx 表名忽略大小写唯一）
fn unique_sheet_name(name: &str, position: usize, used: &mut HashSet<String>) -> String {
    let base = sanitize_sheet_name(name, position);
    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}
