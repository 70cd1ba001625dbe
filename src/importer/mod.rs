// ==========================================
// 设备台账分类汇总 - 导入层
// ==========================================
// 职责: 读取外部工作簿,生成有序的 (表名, 原始表) 列表
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls/.ods), CSV
// ==========================================

pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser, WorkbookParser};
