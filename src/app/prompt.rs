// ==========================================
// 设备台账分类汇总 - 未分类设备选择
// ==========================================
// 职责: 为每个未分类设备取得操作员选择（五个类别或"不选择"）
// 实现: 交互式终端选择（dialoguer）/ JSON 答复文件
// ==========================================

use crate::api::{ApiError, ApiResult, OverrideChoice};
use crate::domain::DeviceCategory;
use crate::i18n::{t, t_with_args};
use dialoguer::Select;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// ChoiceProvider Trait
// ==========================================
pub trait ChoiceProvider {
    /// 为每个设备给出选择,返回顺序与 devices 一致
    fn choose(&mut self, devices: &BTreeSet<String>) -> ApiResult<Vec<(String, OverrideChoice)>>;
}

// ==========================================
// DialoguerPrompt - 终端交互
// ==========================================
#[derive(Debug, Default)]
pub struct DialoguerPrompt;

impl DialoguerPrompt {
    /// 选项: 五个类别（输出列顺序）+ "不选择"
    fn options() -> Vec<OverrideChoice> {
        DeviceCategory::OUTPUT_ORDER
            .iter()
            .map(|category| OverrideChoice::Category(*category))
            .chain(std::iter::once(OverrideChoice::Unselected))
            .collect()
    }

    fn option_label(choice: &OverrideChoice) -> String {
        match choice {
            OverrideChoice::Category(category) => category.label().to_string(),
            OverrideChoice::Unselected => t("cli.unselected"),
        }
    }
}

impl ChoiceProvider for DialoguerPrompt {
    fn choose(&mut self, devices: &BTreeSet<String>) -> ApiResult<Vec<(String, OverrideChoice)>> {
        let options = Self::options();
        let labels: Vec<String> = options.iter().map(Self::option_label).collect();
        let unselected_idx = options.len() - 1;

        let mut choices = Vec::with_capacity(devices.len());
        for device in devices {
            let picked = Select::new()
                .with_prompt(t_with_args("cli.unknown_prompt", &[("device", device.as_str())]))
                .items(&labels)
                .default(unselected_idx)
                .interact()
                .map_err(|e| ApiError::PromptFailed(e.to_string()))?;
            debug!(device = %device, choice = %options[picked], "操作员已选择");
            choices.push((device.clone(), options[picked]));
        }
        Ok(choices)
    }
}

// ==========================================
// JsonAnswerFile - 非交互答复
// ==========================================
// 格式: { "设备名": "I-CAB H", "另一设备": "unselected" }
// 未出现在文件中的设备视为"不选择"; 文件中多余的设备忽略
#[derive(Debug, Clone, Default)]
pub struct JsonAnswerFile {
    answers: BTreeMap<String, OverrideChoice>,
}

impl JsonAnswerFile {
    pub fn from_json(json: &str) -> ApiResult<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let mut answers = BTreeMap::new();
        for (device, value) in raw {
            let choice = value.parse::<OverrideChoice>()?;
            answers.insert(device.trim().to_string(), choice);
        }
        Ok(Self { answers })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ApiResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl ChoiceProvider for JsonAnswerFile {
    fn choose(&mut self, devices: &BTreeSet<String>) -> ApiResult<Vec<(String, OverrideChoice)>> {
        for device in self.answers.keys() {
            if !devices.contains(device) {
                warn!(device = %device, "答复文件中的设备不在未分类列表中,忽略");
            }
        }

        Ok(devices
            .iter()
            .map(|device| {
                let choice = self
                    .answers
                    .get(device)
                    .copied()
                    .unwrap_or(OverrideChoice::Unselected);
                (device.clone(), choice)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_answer_file_choices() {
        let mut answers = JsonAnswerFile::from_json(
            r#"{ "Gizmo": "I-CAB H", " Widget ": "unselected", "Stranger": "BEAME" }"#,
        )
        .unwrap();
        assert_eq!(answers.len(), 3);

        let choices = answers.choose(&devices(&["Gizmo", "Thing", "Widget"])).unwrap();
        assert_eq!(
            choices,
            vec![
                ("Gizmo".to_string(), OverrideChoice::Category(DeviceCategory::ICabH)),
                ("Thing".to_string(), OverrideChoice::Unselected),
                ("Widget".to_string(), OverrideChoice::Unselected),
            ]
        );
    }

    #[test]
    fn test_answer_file_rejects_unknown_label() {
        let result = JsonAnswerFile::from_json(r#"{ "Gizmo": "TOASTER" }"#);
        assert!(matches!(result, Err(ApiError::UnknownCategory(_))));
    }

    #[test]
    fn test_answer_file_rejects_bad_json() {
        let result = JsonAnswerFile::from_json("[1, 2]");
        assert!(matches!(result, Err(ApiError::JsonError(_))));
    }

    #[test]
    fn test_prompt_options() {
        let options = DialoguerPrompt::options();
        assert_eq!(options.len(), 6);
        assert_eq!(options[0], OverrideChoice::Category(DeviceCategory::ICab));
        assert_eq!(options[5], OverrideChoice::Unselected);
    }
}
