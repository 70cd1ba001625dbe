// ==========================================
// 设备台账分类汇总 - 人工覆写表
// ==========================================
// 职责: 设备原始名称（TRIM 后）→ 人工指定类别
// 生命周期: 随单次上传会话创建,会话结束即丢弃
// ==========================================

use crate::domain::types::DeviceCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 人工覆写表
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    entries: BTreeMap<String, DeviceCategory>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一条覆写（键按 TRIM 后保存,空键忽略）
    ///
    /// # 返回
    /// - true: 已写入
    /// - false: 键为空
    pub fn insert(&mut self, device_name: &str, category: DeviceCategory) -> bool {
        let key = device_name.trim();
        if key.is_empty() {
            return false;
        }
        self.entries.insert(key.to_string(), category);
        true
    }

    /// 查找覆写（入参按 TRIM 后比较,区分大小写）
    pub fn lookup(&self, device_name: &str) -> Option<DeviceCategory> {
        self.entries.get(device_name.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DeviceCategory)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup_trimmed() {
        let mut table = OverrideTable::new();
        assert!(table.insert("  Widget X  ", DeviceCategory::Beame));
        assert_eq!(table.lookup("Widget X"), Some(DeviceCategory::Beame));
        assert_eq!(table.lookup(" Widget X\t"), Some(DeviceCategory::Beame));
        // 原始串不做规范化
        assert_eq!(table.lookup("widget x"), None);
    }

    #[test]
    fn test_empty_key_ignored() {
        let mut table = OverrideTable::new();
        assert!(!table.insert("   ", DeviceCategory::ICab));
        assert!(table.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let table: OverrideTable =
            serde_json::from_str(r#"{"Widget X": "I-CAB H", "Gadget": "BAC-I"}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("Gadget"), Some(DeviceCategory::BacI));
    }
}
