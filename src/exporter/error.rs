// ==========================================
// 设备台账分类汇总 - 导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Excel 写入失败: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("输出目录不存在: {0}")]
    OutputDirMissing(String),

    #[error("文件写入失败: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
