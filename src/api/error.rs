// ==========================================
// 设备台账分类汇总 - API层错误类型
// ==========================================
// 职责: 汇总导入/导出错误与操作员输入错误,供 CLI 统一处理
// ==========================================

use crate::domain::UnknownCategoryLabel;
use crate::exporter::ExportError;
use crate::importer::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 文件读写错误
    // ==========================================
    #[error("导入失败: {0}")]
    ImportFailed(#[from] ImportError),

    #[error("导出失败: {0}")]
    ExportFailed(#[from] ExportError),

    #[error("文件读写失败: {0}")]
    IoError(#[from] std::io::Error),

    // ==========================================
    // 操作员输入错误
    // ==========================================
    #[error("无效的设备类别: {0}")]
    UnknownCategory(#[from] UnknownCategoryLabel),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("交互输入失败: {0}")]
    PromptFailed(String),

    #[error("JSON 解析失败: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
