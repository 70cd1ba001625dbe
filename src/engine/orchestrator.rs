// ==========================================
// 设备台账分类汇总 - 工作簿编排器
// ==========================================
// 职责: 对工作簿中每张表执行一轮 规范化 → 汇总
// 说明: 分类器由调用方按轮次显式传入（默认规则 / 覆写优先）
// 红线: 单表失败不阻塞其他表,输出顺序与输入一致
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::{SheetData, SheetOutcome, Workbook};
use crate::engine::aggregator::CustomerAggregator;
use crate::engine::classifier::DeviceClassifier;
use crate::engine::normalizer::SheetNormalizer;
use crate::perf::PerfGuard;
use tracing::{debug, info, instrument, warn};

// ==========================================
// PassResult - 单轮处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    pub outcomes: Vec<SheetOutcome>,
}

impl PassResult {
    pub fn processed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.processed().is_some())
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SheetOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SheetOutcome::Skipped { .. }))
    }
}

// ==========================================
// WorkbookOrchestrator - 工作簿编排器
// ==========================================
#[derive(Debug, Clone)]
pub struct WorkbookOrchestrator {
    config: PipelineConfig,
    normalizer: SheetNormalizer,
    aggregator: CustomerAggregator,
}

impl WorkbookOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - config: 已解析的流水线配置（排除表名等）
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            normalizer: SheetNormalizer::new(),
            aggregator: CustomerAggregator::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 对整个工作簿执行一轮处理
    ///
    /// # 参数
    /// - workbook: 原始工作簿（不会被修改,每轮均从原始数据开始）
    /// - classifier: 本轮使用的分类器
    ///
    /// # 返回
    /// 与输入表一一对应、顺序一致的处理结果
    #[instrument(skip_all, fields(sheets = workbook.sheets.len()))]
    pub fn run_pass(&self, workbook: &Workbook, classifier: &dyn DeviceClassifier) -> PassResult {
        let perf = PerfGuard::new("run_pass");

        let outcomes: Vec<SheetOutcome> = workbook
            .sheets
            .iter()
            .map(|sheet| {
                perf.add_rows(sheet.table.height());
                self.process_sheet(sheet, classifier)
            })
            .collect();

        let result = PassResult { outcomes };
        info!(
            sheets = result.outcomes.len(),
            processed = result.processed_count(),
            skipped = result.skipped().count(),
            "工作簿处理完成"
        );
        result
    }

    /// 处理单张表
    pub fn process_sheet(
        &self,
        sheet: &SheetData,
        classifier: &dyn DeviceClassifier,
    ) -> SheetOutcome {
        // === 步骤 1: 排除表原样透传 ===
        if self.config.is_excluded_sheet(&sheet.name) {
            debug!(sheet = %sheet.name, "排除表,原样透传");
            return SheetOutcome::Excluded {
                name: sheet.name.clone(),
                table: sheet.table.clone(),
                source: sheet.source.clone(),
            };
        }

        // === 步骤 2: 规范化（列角色缺失 → 跳过） ===
        let normalized = match self.normalizer.normalize(&sheet.table) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(sheet = %sheet.name, error = %e, "工作表缺少必需列,跳过处理");
                return SheetOutcome::Skipped {
                    name: sheet.name.clone(),
                    table: sheet.table.clone(),
                    source: sheet.source.clone(),
                    missing: e.missing_roles().to_vec(),
                };
            }
        };

        // === 步骤 3: 客户汇总 ===
        let processed = self.aggregator.aggregate(&normalized, classifier);
        debug!(
            sheet = %sheet.name,
            rows = processed.table.height(),
            groups = processed.groups.len(),
            "工作表汇总完成"
        );

        SheetOutcome::Processed {
            name: sheet.name.clone(),
            sheet: processed,
        }
    }
}

impl Default for WorkbookOrchestrator {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, ColumnRole, DeviceCategory, OverrideTable, RawTable, SheetStatus};
    use crate::engine::classifier::{DefaultRulesClassifier, OverrideAwareClassifier};

    fn inventory_table() -> RawTable {
        RawTable::new(
            vec!["Customer".into(), "Device".into(), "Qty".into()],
            vec![
                vec![CellValue::text("Acme"), CellValue::text("BAC-I 100"), CellValue::Int(5)],
                vec![CellValue::Empty, CellValue::text("Gizmo"), CellValue::Int(2)],
            ],
        )
    }

    fn workbook() -> Workbook {
        Workbook::new(vec![
            SheetData::new("Inventory", inventory_table()),
            SheetData::new(" DE/RE/maintenance ", inventory_table()),
            SheetData::new(
                "Notes",
                RawTable::new(vec!["Remark".into()], vec![vec![CellValue::text("hello")]]),
            ),
        ])
    }

    #[test]
    fn test_pass_preserves_order_and_status() {
        let wb = workbook();
        let result = WorkbookOrchestrator::default().run_pass(&wb, &DefaultRulesClassifier::default());

        let names: Vec<&str> = result.outcomes.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["Inventory", " DE/RE/maintenance ", "Notes"]);

        let statuses: Vec<SheetStatus> = result.outcomes.iter().map(|o| o.status()).collect();
        assert_eq!(
            statuses,
            vec![SheetStatus::Processed, SheetStatus::Excluded, SheetStatus::Skipped]
        );
        assert_eq!(result.processed_count(), 1);
    }

    #[test]
    fn test_excluded_sheet_passes_through_unchanged() {
        let wb = workbook();
        let result = WorkbookOrchestrator::default().run_pass(&wb, &DefaultRulesClassifier::default());
        assert_eq!(result.outcomes[1].output_table(), &inventory_table());
        assert_eq!(result.outcomes[1].passthrough_source(), Some(&wb.sheets[1].source));
        assert_eq!(result.outcomes[0].passthrough_source(), None);
    }

    #[test]
    fn test_skipped_sheet_reports_missing_roles() {
        let wb = workbook();
        let result = WorkbookOrchestrator::default().run_pass(&wb, &DefaultRulesClassifier::default());
        match &result.outcomes[2] {
            SheetOutcome::Skipped { table, missing, .. } => {
                assert_eq!(
                    missing,
                    &vec![ColumnRole::Customer, ColumnRole::Device, ColumnRole::Qty]
                );
                assert_eq!(table, &wb.sheets[2].table);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_second_pass_with_overrides() {
        let wb = workbook();
        let orchestrator = WorkbookOrchestrator::default();
        let rules = DefaultRulesClassifier::default();

        let first = orchestrator.run_pass(&wb, &rules);
        let first_totals = first.outcomes[0].processed().unwrap().groups[0].totals;
        assert_eq!(first_totals.get(DeviceCategory::BacI), 5);
        assert_eq!(first_totals.sum(), 5);

        let mut overrides = OverrideTable::new();
        overrides.insert("Gizmo", DeviceCategory::Beame);
        let second = orchestrator.run_pass(&wb, &OverrideAwareClassifier::new(&overrides, rules));
        let second_totals = second.outcomes[0].processed().unwrap().groups[0].totals;
        assert_eq!(second_totals.get(DeviceCategory::BacI), 5);
        assert_eq!(second_totals.get(DeviceCategory::Beame), 2);
    }

    #[test]
    fn test_custom_excluded_sheet() {
        let config = PipelineConfig {
            excluded_sheet: "Inventory".into(),
            ..PipelineConfig::default()
        };
        let wb = workbook();
        let result = WorkbookOrchestrator::new(config).run_pass(&wb, &DefaultRulesClassifier::default());
        assert_eq!(result.outcomes[0].status(), SheetStatus::Excluded);
        assert_eq!(result.outcomes[1].status(), SheetStatus::Processed);
    }
}
