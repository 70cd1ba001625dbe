// ==========================================
// 设备台账分类汇总 - 应用层
// ==========================================
// 职责: 命令行集成（参数解析、交互选择、提示输出）
// ==========================================

pub mod cli;
pub mod prompt;

pub use cli::{default_output_path, run, Cli};
pub use prompt::{ChoiceProvider, DialoguerPrompt, JsonAnswerFile};
