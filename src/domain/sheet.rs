// ==========================================
// 设备台账分类汇总 - 表格领域模型
// ==========================================
// 职责: 单元格、原始表、列角色映射、处理结果
// 用途: 导入层写入,引擎层读取并生成新表,导出层只读
// ==========================================

use crate::domain::types::{ColumnRole, DeviceCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值（异构）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    /// 文本单元格（空串保留为 Text,由 is_blank 判定空白）
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// 空白判定: Empty 或 TRIM 后为空的文本
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 仅文本单元格返回字符串
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 显示文本（用于列名提升、覆写表查找、报表）
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }

    /// 数量解析为整数
    ///
    /// # 规则
    /// - 整数原样返回
    /// - 浮点数/数字文本向零截断
    /// - 空白、非数字、布尔 → 0（静默兜底,不报错）
    pub fn to_quantity(&self) -> i64 {
        match self {
            CellValue::Int(i) => *i,
            CellValue::Float(f) => truncate_float(*f),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(truncate_float))
                    .unwrap_or(0)
            }
            CellValue::Empty | CellValue::Bool(_) => 0,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

fn truncate_float(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// 原始行: 与列名按位置对齐
pub type RawRow = Vec<CellValue>;

// ==========================================
// RawTable - 矩形原始表
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// 构造矩形表: 短行补 Empty,超宽行补 `Unnamed: N` 列名
    pub fn new(mut columns: Vec<String>, mut rows: Vec<RawRow>) -> Self {
        let widest = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        while columns.len() < widest {
            columns.push(unnamed_label(columns.len()));
        }
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self { columns, rows }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// 按精确列名查找第一列下标
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// 按列名取单元格
    pub fn get(&self, row: usize, label: &str) -> Option<&CellValue> {
        let col = self.column_index(label)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// 空表头单元格的占位列名
pub fn unnamed_label(index: usize) -> String {
    format!("Unnamed: {}", index)
}

// ==========================================
// SourceGrid - 导入时的原样单元格网格
// ==========================================
// 透传表（排除表/跳过表）按此写回: 保留表头原文、空白表头与起始位置
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceGrid {
    /// 首个单元格所在行（0 起）
    pub start_row: u32,
    /// 首个单元格所在列（0 起）
    pub start_col: u16,
    pub rows: Vec<RawRow>,
}

impl SourceGrid {
    pub fn new(start_row: u32, start_col: u16, rows: Vec<RawRow>) -> Self {
        Self {
            start_row,
            start_col,
            rows,
        }
    }

    /// 由内存表构造（列名行 + 数据行,从 A1 开始）
    pub fn from_table(table: &RawTable) -> Self {
        if table.is_empty() {
            return Self::default();
        }
        let header: RawRow = table.columns.iter().map(|c| CellValue::text(c.as_str())).collect();
        let rows = std::iter::once(header)
            .chain(table.rows.iter().cloned())
            .collect();
        Self::new(0, 0, rows)
    }
}

// ==========================================
// Workbook - 工作簿（有序工作表）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetData {
    pub name: String,
    pub table: RawTable,
    pub source: SourceGrid,
}

impl SheetData {
    /// 内存构造: 原样网格由表推出
    pub fn new(name: impl Into<String>, table: RawTable) -> Self {
        let source = SourceGrid::from_table(&table);
        Self {
            name: name.into(),
            table,
            source,
        }
    }

    /// 导入构造: 同时保留文件中的原样网格
    pub fn with_source(name: impl Into<String>, table: RawTable, source: SourceGrid) -> Self {
        Self {
            name: name.into(),
            table,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<SheetData>,
}

impl Workbook {
    pub fn new(sheets: Vec<SheetData>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

// ==========================================
// ColumnRoleMap - 逻辑角色 → 实际列名
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoleMap {
    pub customer: String,
    pub device: String,
    pub qty: String,
}

/// 规范化后的表（列已清理,三个角色全部解析）
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSheet {
    pub table: RawTable,
    pub roles: ColumnRoleMap,
}

// ==========================================
// CategoryTotals - 分组内各类别数量合计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryTotals([i64; 5]);

impl CategoryTotals {
    /// 累加数量（溢出时饱和,不 panic）
    pub fn add(&mut self, category: DeviceCategory, qty: i64) {
        let slot = &mut self.0[category.index()];
        *slot = slot.saturating_add(qty);
    }

    pub fn get(&self, category: DeviceCategory) -> i64 {
        self.0[category.index()]
    }

    /// 五个类别之和（NEW QTY 口径）
    pub fn sum(&self) -> i64 {
        self.0.iter().fold(0i64, |acc, qty| acc.saturating_add(*qty))
    }
}

/// 单个客户分组的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub customer: String,
    pub first_row: usize,
    pub row_count: usize,
    pub totals: CategoryTotals,
    pub new_qty: i64,
}

/// 已汇总的工作表
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedSheet {
    pub table: RawTable,
    pub roles: ColumnRoleMap,
    pub groups: Vec<GroupSummary>,
}

/// 输出汇总列名
pub const NEW_QTY_COLUMN: &str = "NEW QTY";

// ==========================================
// SheetOutcome - 单表处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum SheetOutcome {
    /// 完成规范化与汇总
    Processed { name: String, sheet: ProcessedSheet },
    /// 列角色缺失,原表透传
    Skipped {
        name: String,
        table: RawTable,
        source: SourceGrid,
        missing: Vec<ColumnRole>,
    },
    /// 排除表（维护表）,原表透传
    Excluded {
        name: String,
        table: RawTable,
        source: SourceGrid,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SheetStatus {
    Processed,
    Skipped,
    Excluded,
}

impl SheetOutcome {
    pub fn name(&self) -> &str {
        match self {
            SheetOutcome::Processed { name, .. }
            | SheetOutcome::Skipped { name, .. }
            | SheetOutcome::Excluded { name, .. } => name,
        }
    }

    /// 写出用的表
    pub fn output_table(&self) -> &RawTable {
        match self {
            SheetOutcome::Processed { sheet, .. } => &sheet.table,
            SheetOutcome::Skipped { table, .. } | SheetOutcome::Excluded { table, .. } => table,
        }
    }

    /// 透传表的原样网格（已汇总表为 None）
    pub fn passthrough_source(&self) -> Option<&SourceGrid> {
        match self {
            SheetOutcome::Processed { .. } => None,
            SheetOutcome::Skipped { source, .. } | SheetOutcome::Excluded { source, .. } => {
                Some(source)
            }
        }
    }

    pub fn status(&self) -> SheetStatus {
        match self {
            SheetOutcome::Processed { .. } => SheetStatus::Processed,
            SheetOutcome::Skipped { .. } => SheetStatus::Skipped,
            SheetOutcome::Excluded { .. } => SheetStatus::Excluded,
        }
    }

    pub fn processed(&self) -> Option<&ProcessedSheet> {
        match self {
            SheetOutcome::Processed { sheet, .. } => Some(sheet),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_coercion() {
        assert_eq!(CellValue::Int(5).to_quantity(), 5);
        assert_eq!(CellValue::Float(2.9).to_quantity(), 2);
        assert_eq!(CellValue::text(" 7 ").to_quantity(), 7);
        assert_eq!(CellValue::text("3.5").to_quantity(), 3);
        assert_eq!(CellValue::text("n/a").to_quantity(), 0);
        assert_eq!(CellValue::Empty.to_quantity(), 0);
        assert_eq!(CellValue::Bool(true).to_quantity(), 0);
        assert_eq!(CellValue::Float(f64::NAN).to_quantity(), 0);
    }

    #[test]
    fn test_blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::text("Acme").is_blank());
        assert!(!CellValue::Int(0).is_blank());
    }

    #[test]
    fn test_display_text_of_whole_float() {
        assert_eq!(CellValue::Float(12345.0).display_text(), "12345");
        assert_eq!(CellValue::Float(1.5).display_text(), "1.5");
    }

    #[test]
    fn test_raw_table_is_rectangular() {
        let table = RawTable::new(
            vec!["a".to_string()],
            vec![vec![CellValue::Int(1), CellValue::Int(2)], vec![]],
        );
        assert_eq!(table.columns, vec!["a".to_string(), "Unnamed: 1".to_string()]);
        assert!(table.rows.iter().all(|r| r.len() == 2));
        assert_eq!(table.get(0, "Unnamed: 1"), Some(&CellValue::Int(2)));
    }

    #[test]
    fn test_category_totals_saturate_on_huge_quantities() {
        let huge = CellValue::Float(1e19).to_quantity();
        assert_eq!(huge, i64::MAX);

        let mut totals = CategoryTotals::default();
        totals.add(DeviceCategory::Beame, huge);
        totals.add(DeviceCategory::Beame, huge);
        totals.add(DeviceCategory::BacI, 5);
        assert_eq!(totals.get(DeviceCategory::Beame), i64::MAX);
        assert_eq!(totals.sum(), i64::MAX);

        totals.add(DeviceCategory::ICab, i64::MIN);
        assert_eq!(totals.get(DeviceCategory::ICab), i64::MIN);
    }

    #[test]
    fn test_source_grid_from_table() {
        let table = RawTable::new(
            vec!["Customer".into(), "Qty".into()],
            vec![vec![CellValue::text("Acme"), CellValue::Int(1)]],
        );
        let grid = SourceGrid::from_table(&table);
        assert_eq!((grid.start_row, grid.start_col), (0, 0));
        assert_eq!(grid.rows[0], vec![CellValue::text("Customer"), CellValue::text("Qty")]);
        assert_eq!(grid.rows[1], table.rows[0]);
        assert!(SourceGrid::from_table(&RawTable::default()).rows.is_empty());
    }

    #[test]
    fn test_category_totals_sum() {
        let mut totals = CategoryTotals::default();
        totals.add(DeviceCategory::BacI, 5);
        totals.add(DeviceCategory::ICabH, 3);
        totals.add(DeviceCategory::BacI, 1);
        assert_eq!(totals.get(DeviceCategory::BacI), 6);
        assert_eq!(totals.sum(), 9);
    }
}
