// ==========================================
// 设备台账分类汇总 - 流水线配置读取 Trait
// ==========================================
// 职责: 定义流水线所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// PipelineConfigReader Trait
// ==========================================
// 用途: 引擎/会话层读取配置
// 实现者: ConfigManager（环境变量 / 显式键值）
pub trait PipelineConfigReader {
    /// 是否把 "bai03" 视为 BAC-I 产品代号
    ///
    /// # 默认值
    /// - true
    fn get_bai03_alias(&self) -> bool;

    /// 排除处理的工作表名（TRIM 后忽略大小写比较）
    ///
    /// # 默认值
    /// - "de/re/maintenance"
    fn get_excluded_sheet(&self) -> String;

    /// 触发整行加粗下划线的列名（精确匹配）
    ///
    /// # 默认值
    /// - "Customer Code"
    fn get_highlight_column(&self) -> String;

    /// 读取全部配置为快照
    fn snapshot(&self) -> PipelineConfig {
        PipelineConfig {
            bai03_alias: self.get_bai03_alias(),
            excluded_sheet: self.get_excluded_sheet(),
            highlight_column: self.get_highlight_column(),
        }
    }
}

// ==========================================
// PipelineConfig - 已解析的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub bai03_alias: bool,
    pub excluded_sheet: String,
    pub highlight_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bai03_alias: true,
            excluded_sheet: "de/re/maintenance".to_string(),
            highlight_column: "Customer Code".to_string(),
        }
    }
}

impl PipelineConfig {
    /// 工作表是否被排除
    pub fn is_excluded_sheet(&self, sheet_name: &str) -> bool {
        sheet_name
            .trim()
            .eq_ignore_ascii_case(self.excluded_sheet.trim())
    }
}
