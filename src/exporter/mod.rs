// ==========================================
// 设备台账分类汇总 - 导出层
// ==========================================
// 职责: 处理结果 → 单个 xlsx 文件（表名/顺序与输入一致）
// 样式: 指定列非空的行整行加粗 + 单下划线
// ==========================================

pub mod error;
pub mod workbook_writer;

// 重导出核心类型
pub use error::{ExportError, ExportResult};
pub use workbook_writer::{sanitize_sheet_name, WorkbookWriter};
