// ==========================================
// 设备台账分类汇总 - 核心库
// ==========================================
// 流程: 读取工作簿 → 规范化 → 设备分类 → 客户汇总 → 导出 xlsx
// 系统定位: 离线批处理工具 (未分类设备由操作员确认)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 单元格/表格/类别/覆写表
pub mod domain;

// 引擎层 - 分类与汇总规则
pub mod engine;

// 导入层 - 外部工作簿
pub mod importer;

// 导出层 - xlsx 写出
pub mod exporter;

// 配置层 - 运行配置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 性能统计
pub mod perf;

// API 层 - 会话接口
pub mod api;

// 应用层 - 命令行集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CategoryTotals, CellValue, ColumnRole, DeviceCategory, GroupSummary, OverrideTable,
    RawTable, SheetData, SheetOutcome, SheetStatus, Workbook,
};

// 引擎
pub use engine::{
    CustomerAggregator, DefaultRulesClassifier, DeviceClassifier, OverrideAwareClassifier,
    SheetNormalizer, UnknownDeviceCollector, WorkbookOrchestrator,
};

// API
pub use api::{OverrideChoice, SessionReport, TallySession};

// 配置
pub use config::PipelineConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备台账分类汇总";
