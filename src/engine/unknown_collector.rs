// ==========================================
// 设备台账分类汇总 - 未分类设备收集器
// ==========================================
// 职责: 扫描已汇总工作表的设备列,收集默认规则无法分类的设备名
// 说明: 始终使用默认规则（忽略覆写表）,结果去重、TRIM、排序
// ==========================================

use crate::domain::{RawTable, SheetOutcome};
use crate::engine::classifier::{DefaultRulesClassifier, DeviceClassifier};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownDeviceCollector {
    rules: DefaultRulesClassifier,
}

impl UnknownDeviceCollector {
    pub fn new(rules: DefaultRulesClassifier) -> Self {
        Self { rules }
    }

    /// 收集所有已汇总工作表中的未分类设备
    ///
    /// # 说明
    /// - 跳过/排除的工作表不参与扫描
    /// - 设备列取首个列名含 "device" 的列（忽略大小写）
    pub fn collect_unknown(&self, outcomes: &[SheetOutcome]) -> BTreeSet<String> {
        let mut unknown = BTreeSet::new();
        for outcome in outcomes {
            let Some(processed) = outcome.processed() else {
                continue;
            };
            let found = self.collect_from_table(&processed.table);
            debug!(sheet = outcome.name(), unknown = found.len(), "未分类设备扫描完成");
            unknown.extend(found);
        }
        unknown
    }

    fn collect_from_table(&self, table: &RawTable) -> BTreeSet<String> {
        let Some(col) = device_column(table) else {
            return BTreeSet::new();
        };

        table
            .rows
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|cell| !cell.is_blank())
            .filter(|cell| self.rules.classify(cell).is_none())
            .map(|cell| cell.display_text().trim().to_string())
            .collect()
    }
}

/// 首个列名含 "device" 的列
fn device_column(table: &RawTable) -> Option<usize> {
    table
        .columns
        .iter()
        .position(|label| label.to_lowercase().contains("device"))
}
