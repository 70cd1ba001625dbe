// ==========================================
// 设备台账分类汇总 - 设备分类器
// ==========================================
// 职责: 设备名称 → 固定类别（关键字规则,首个命中生效）
// 红线: 规则顺序有意义,类别之间存在子串重叠
// ==========================================

use crate::domain::{CellValue, DeviceCategory, OverrideTable};

// ==========================================
// DeviceClassifier Trait
// ==========================================
// 实现者: DefaultRulesClassifier（默认规则）, OverrideAwareClassifier（覆写优先）
// 调用方按汇总轮次显式选择实现
pub trait DeviceClassifier {
    /// 对设备单元格分类
    ///
    /// # 返回
    /// - Some(DeviceCategory): 命中类别
    /// - None: 未分类（非错误,等待人工处理）
    fn classify(&self, device: &CellValue) -> Option<DeviceCategory>;
}

/// 名称规范化: TRIM → 小写 → 去除连字符/下划线/空格
pub fn normalize_device_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect()
}

// ==========================================
// DefaultRulesClassifier - 默认关键字规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRulesClassifier {
    // 是否把 "bai03" 视为 BAC-I 产品代号
    bai03_alias: bool,
}

impl Default for DefaultRulesClassifier {
    fn default() -> Self {
        Self { bai03_alias: true }
    }
}

impl DefaultRulesClassifier {
    pub fn new(bai03_alias: bool) -> Self {
        Self { bai03_alias }
    }

    /// 对设备名称字符串分类
    ///
    /// # 规则（首个命中生效）
    /// 1. beame / blame → BEAME
    /// 2. baci（或启用别名时 bai03）→ BAC-I
    /// 3. icabm → I-CAB M
    /// 4. icabh → I-CAB H
    /// 5. combo 且不含 baci → I-CAB
    /// 6. icab → I-CAB
    /// 7. 其他 → 未分类
    pub fn classify_name(&self, name: &str) -> Option<DeviceCategory> {
        let n = normalize_device_name(name);

        if n.contains("beame") || n.contains("blame") {
            return Some(DeviceCategory::Beame);
        }
        if n.contains("baci") || (self.bai03_alias && n.contains("bai03")) {
            return Some(DeviceCategory::BacI);
        }
        // icabm/icabh 仅做子串判断（子串已覆盖整词匹配）
        if n.contains("icabm") {
            return Some(DeviceCategory::ICabM);
        }
        if n.contains("icabh") {
            return Some(DeviceCategory::ICabH);
        }
        if n.contains("combo") && !n.contains("baci") {
            return Some(DeviceCategory::ICab);
        }
        if n.contains("icab") {
            return Some(DeviceCategory::ICab);
        }
        None
    }
}

impl DeviceClassifier for DefaultRulesClassifier {
    fn classify(&self, device: &CellValue) -> Option<DeviceCategory> {
        // 非文本 → 未分类
        device.as_text().and_then(|name| self.classify_name(name))
    }
}

// ==========================================
// OverrideAwareClassifier - 覆写优先
// ==========================================
// 先按原始文本（TRIM,不规范化）查覆写表,未命中再走默认规则
#[derive(Debug, Clone, Copy)]
pub struct OverrideAwareClassifier<'a> {
    overrides: &'a OverrideTable,
    rules: DefaultRulesClassifier,
}

impl<'a> OverrideAwareClassifier<'a> {
    pub fn new(overrides: &'a OverrideTable, rules: DefaultRulesClassifier) -> Self {
        Self { overrides, rules }
    }
}

impl DeviceClassifier for OverrideAwareClassifier<'_> {
    fn classify(&self, device: &CellValue) -> Option<DeviceCategory> {
        if !device.is_blank() {
            if let Some(category) = self.overrides.lookup(&device.display_text()) {
                return Some(category);
            }
        }
        self.rules.classify(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> Option<DeviceCategory> {
        DefaultRulesClassifier::default().classify_name(name)
    }

    #[test]
    fn test_rule_cases() {
        assert_eq!(classify("BAC-I Combo Unit"), Some(DeviceCategory::BacI));
        assert_eq!(classify("COMBO-X200"), Some(DeviceCategory::ICab));
        assert_eq!(classify("ICAB-H200"), Some(DeviceCategory::ICabH));
        assert_eq!(classify("I-CAB M 10"), Some(DeviceCategory::ICabM));
        assert_eq!(classify("i_cab standard"), Some(DeviceCategory::ICab));
        assert_eq!(classify("Beame Pro"), Some(DeviceCategory::Beame));
        assert_eq!(classify("unknown-widget"), None);
    }

    #[test]
    fn test_blame_misspelling_is_beame() {
        assert_eq!(classify("BLAME 2"), Some(DeviceCategory::Beame));
    }

    #[test]
    fn test_beame_precedes_everything() {
        // 同时含 beame 与 icabh,按规则顺序取 BEAME
        assert_eq!(classify("Beame + ICAB-H kit"), Some(DeviceCategory::Beame));
    }

    #[test]
    fn test_bai03_alias_is_configurable() {
        let with_alias = DefaultRulesClassifier::new(true);
        let without_alias = DefaultRulesClassifier::new(false);
        assert_eq!(with_alias.classify_name("BAI03-77"), Some(DeviceCategory::BacI));
        assert_eq!(without_alias.classify_name("BAI03-77"), None);
    }

    #[test]
    fn test_normalization_invariance() {
        let variants = ["I-CAB H 50", "icab_h50", "ICABH50", "  i cab-h_50  ", "I_C_A_B_H 5-0"];
        for v in variants {
            assert_eq!(classify(v), Some(DeviceCategory::ICabH), "variant {:?}", v);
        }
    }

    #[test]
    fn test_non_text_is_unclassified() {
        let rules = DefaultRulesClassifier::default();
        assert_eq!(rules.classify(&CellValue::Int(42)), None);
        assert_eq!(rules.classify(&CellValue::Empty), None);
        assert_eq!(rules.classify(&CellValue::Float(1.0)), None);
    }

    #[test]
    fn test_override_wins_over_rules() {
        let mut overrides = OverrideTable::new();
        overrides.insert("BAC-I Combo Unit", DeviceCategory::ICabM);
        overrides.insert("Widget 9", DeviceCategory::Beame);
        let classifier = OverrideAwareClassifier::new(&overrides, DefaultRulesClassifier::default());

        assert_eq!(
            classifier.classify(&CellValue::text("BAC-I Combo Unit")),
            Some(DeviceCategory::ICabM)
        );
        assert_eq!(
            classifier.classify(&CellValue::text("  Widget 9 ")),
            Some(DeviceCategory::Beame)
        );
        // 未覆写的走默认规则
        assert_eq!(
            classifier.classify(&CellValue::text("COMBO-X200")),
            Some(DeviceCategory::ICab)
        );
        assert_eq!(classifier.classify(&CellValue::text("widget 9")), None);
    }

    #[test]
    fn test_override_on_numeric_device_code() {
        let mut overrides = OverrideTable::new();
        overrides.insert("12345", DeviceCategory::BacI);
        let classifier = OverrideAwareClassifier::new(&overrides, DefaultRulesClassifier::default());
        assert_eq!(classifier.classify(&CellValue::Float(12345.0)), Some(DeviceCategory::BacI));
    }
}
