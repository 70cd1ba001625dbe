// ==========================================
// 设备台账分类汇总 - 引擎层
// ==========================================
// 职责: 设备分类、表格规范化、客户汇总、未分类收集
// 红线: 引擎不做文件读写,不做交互
// ==========================================

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod normalizer;
pub mod orchestrator;
pub mod unknown_collector;

// 重导出核心引擎
pub use aggregator::CustomerAggregator;
pub use classifier::{
    normalize_device_name, DefaultRulesClassifier, DeviceClassifier, OverrideAwareClassifier,
};
pub use error::{SchemaError, SchemaResult};
pub use normalizer::SheetNormalizer;
pub use orchestrator::{PassResult, WorkbookOrchestrator};
pub use unknown_collector::UnknownDeviceCollector;
