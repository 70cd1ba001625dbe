// ==========================================
// 设备台账分类汇总 - 领域类型定义
// ==========================================
// 职责: 设备类别枚举、列角色枚举
// 红线: 类别标签为固定字面量,不做本地化
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 设备类别 (Device Category)
// ==========================================
// 未分类不在枚举中,以 Option::None 表达
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceCategory {
    #[serde(rename = "BAC-I")]
    BacI,
    #[serde(rename = "I-CAB")]
    ICab,
    #[serde(rename = "I-CAB H")]
    ICabH,
    #[serde(rename = "I-CAB M")]
    ICabM,
    #[serde(rename = "BEAME")]
    Beame,
}

impl DeviceCategory {
    /// 计算顺序（累加时使用）
    pub const ALL: [DeviceCategory; 5] = [
        DeviceCategory::BacI,
        DeviceCategory::ICab,
        DeviceCategory::ICabH,
        DeviceCategory::ICabM,
        DeviceCategory::Beame,
    ];

    /// 输出列顺序（I-CAB 在 BAC-I 之前,仅为展示约定）
    pub const OUTPUT_ORDER: [DeviceCategory; 5] = [
        DeviceCategory::ICab,
        DeviceCategory::BacI,
        DeviceCategory::ICabH,
        DeviceCategory::ICabM,
        DeviceCategory::Beame,
    ];

    /// 类别标签（同时作为输出列名）
    pub fn label(&self) -> &'static str {
        match self {
            DeviceCategory::BacI => "BAC-I",
            DeviceCategory::ICab => "I-CAB",
            DeviceCategory::ICabH => "I-CAB H",
            DeviceCategory::ICabM => "I-CAB M",
            DeviceCategory::Beame => "BEAME",
        }
    }

    /// 在 ALL 中的下标
    pub(crate) fn index(&self) -> usize {
        match self {
            DeviceCategory::BacI => 0,
            DeviceCategory::ICab => 1,
            DeviceCategory::ICabH => 2,
            DeviceCategory::ICabM => 3,
            DeviceCategory::Beame => 4,
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 类别标签解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的设备类别: {0}")]
pub struct UnknownCategoryLabel(pub String);

impl FromStr for DeviceCategory {
    type Err = UnknownCategoryLabel;

    /// 按字面标签解析（忽略首尾空白与大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DeviceCategory::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategoryLabel(s.to_string()))
    }
}

// ==========================================
// 列角色 (Column Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnRole {
    Customer,
    Device,
    Qty,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 3] = [ColumnRole::Customer, ColumnRole::Device, ColumnRole::Qty];

    /// 列名匹配关键字（小写子串）
    pub fn keyword(&self) -> &'static str {
        match self {
            ColumnRole::Customer => "customer",
            ColumnRole::Device => "device",
            ColumnRole::Qty => "qty",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
