// ==========================================
// 设备台账分类汇总 - API 层
// ==========================================
// 职责: 会话 API（导入 → 一轮汇总 → 覆写 → 二轮汇总 → 导出）,供 CLI 调用
// ==========================================

pub mod error;
pub mod session_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use session_api::{OverrideChoice, SessionPhase, SessionReport, SheetReport, TallySession};
