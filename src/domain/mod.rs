// ==========================================
// 设备台账分类汇总 - 领域模型层
// ==========================================
// 职责: 定义单元格/表格/类别/覆写表等领域类型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod overrides;
pub mod sheet;
pub mod types;

// 重导出核心类型
pub use overrides::OverrideTable;
pub use sheet::{
    CategoryTotals, CellValue, ColumnRoleMap, GroupSummary, NormalizedSheet, ProcessedSheet,
    RawRow, RawTable, SheetData, SheetOutcome, SourceGrid, SheetStatus, Workbook, NEW_QTY_COLUMN,
    unnamed_label,
};
pub use types::{ColumnRole, DeviceCategory, UnknownCategoryLabel};
