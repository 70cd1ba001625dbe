// ==========================================
// 设备台账分类汇总 - 配置层
// ==========================================
// 职责: 运行配置读取,缺省值兜底
// 存储: 无（环境变量 / 显式键值）
// ==========================================

pub mod config_manager;
pub mod pipeline_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use pipeline_config_trait::{PipelineConfig, PipelineConfigReader};
