// ==========================================
// 设备台账分类汇总 - 配置管理器
// ==========================================
// 职责: 配置加载、查询,缺省值兜底
// 来源: DEVICE_TALLY_* 环境变量,或显式键值（测试/嵌入调用）
// 说明: 不落盘,每次运行重新读取
// ==========================================

use crate::config::pipeline_config_trait::PipelineConfigReader;
use std::collections::HashMap;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "DEVICE_TALLY_";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 从显式键值创建（键为 config_keys 中的常量）
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 从环境变量读取（DEVICE_TALLY_<KEY 大写>）
    pub fn from_env() -> Self {
        let values = config_keys::ALL
            .iter()
            .filter_map(|key| {
                std::env::var(env_var_name(key))
                    .ok()
                    .map(|v| (key.to_string(), v))
            })
            .collect();
        Self { values }
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值（已 TRIM,空值视为未配置）
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// 读取配置值,带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key)
            .unwrap_or_else(|| default.to_string())
    }
}

/// 配置键 → 环境变量名
pub fn env_var_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.to_uppercase())
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

// ==========================================
// PipelineConfigReader Trait 实现
// ==========================================
impl PipelineConfigReader for ConfigManager {
    fn get_bai03_alias(&self) -> bool {
        let value = self.get_config_or_default(config_keys::BAI03_ALIAS, "true");
        parse_bool(&value).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::BAI03_ALIAS,
                raw_value = %value,
                "布尔配置格式错误，使用默认值 true"
            );
            true
        })
    }

    fn get_excluded_sheet(&self) -> String {
        self.get_config_or_default(config_keys::EXCLUDED_SHEET, "de/re/maintenance")
    }

    fn get_highlight_column(&self) -> String {
        self.get_config_or_default(config_keys::HIGHLIGHT_COLUMN, "Customer Code")
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 分类规则
    pub const BAI03_ALIAS: &str = "bai03_alias";

    // 工作表排除
    pub const EXCLUDED_SHEET: &str = "excluded_sheet";

    // 导出样式
    pub const HIGHLIGHT_COLUMN: &str = "highlight_column";

    pub const ALL: [&str; 3] = [BAI03_ALIAS, EXCLUDED_SHEET, HIGHLIGHT_COLUMN];
}
