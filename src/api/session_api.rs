// ==========================================
// 设备台账分类汇总 - 会话 API
// ==========================================
// 职责: 一次上传 = 一个会话; 持有原始工作簿、覆写表与两轮处理结果
// 流程: 导入 → 一轮（默认规则）→ 收集未分类 → 覆写 → 二轮（覆写优先）→ 导出
// 红线: 覆写表只属于本会话,二轮从原始工作簿重新开始
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::PipelineConfig;
use crate::domain::{
    ColumnRole, DeviceCategory, OverrideTable, SheetOutcome, SheetStatus, Workbook,
};
use crate::engine::{
    DefaultRulesClassifier, OverrideAwareClassifier, PassResult, UnknownDeviceCollector,
    WorkbookOrchestrator,
};
use crate::exporter::WorkbookWriter;
use crate::importer::UniversalFileParser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument};
use uuid::Uuid;

/// 操作员"不选择"的取值
pub const UNSELECTED: &str = "unselected";

// ==========================================
// OverrideChoice - 单个未分类设备的选择
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideChoice {
    Category(DeviceCategory),
    Unselected,
}

impl FromStr for OverrideChoice {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(UNSELECTED) {
            return Ok(OverrideChoice::Unselected);
        }
        Ok(OverrideChoice::Category(s.parse::<DeviceCategory>()?))
    }
}

impl fmt::Display for OverrideChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideChoice::Category(category) => write!(f, "{}", category),
            OverrideChoice::Unselected => f.write_str(UNSELECTED),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    /// 仅完成默认规则汇总
    Initial,
    /// 已应用覆写并重新汇总
    Resolved,
}

// ==========================================
// SessionReport - 会话报告（JSON）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetReport {
    pub name: String,
    pub status: SheetStatus,
    pub rows: usize,
    pub groups: usize,
    /// 跳过表缺失的列角色
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub missing_columns: Vec<ColumnRole>,
    /// 各组 NEW QTY 之和
    pub new_qty_total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub phase: SessionPhase,
    pub config: PipelineConfig,
    pub sheets: Vec<SheetReport>,
    pub unknown_devices: Vec<String>,
    pub overrides_applied: OverrideTable,
    /// 仍未被覆写覆盖的设备
    pub unresolved_devices: Vec<String>,
}

// ==========================================
// TallySession - 汇总会话
// ==========================================
#[derive(Debug, Clone)]
pub struct TallySession {
    session_id: String,
    source: String,
    started_at: DateTime<Utc>,
    workbook: Workbook,
    rules: DefaultRulesClassifier,
    orchestrator: WorkbookOrchestrator,
    overrides: OverrideTable,
    unknown: BTreeSet<String>,
    initial: PassResult,
    resolved: Option<PassResult>,
}

impl TallySession {
    /// 读取文件并完成一轮汇总
    ///
    /// # 返回
    /// - Err(ApiError::ImportFailed): 文件不可读或格式不支持
    pub fn open<P: AsRef<Path>>(path: P, config: PipelineConfig) -> ApiResult<Self> {
        let started_at = Utc::now();
        let path = path.as_ref();
        let workbook = UniversalFileParser.parse(path)?;
        Ok(Self::start(path.display().to_string(), workbook, config, started_at))
    }

    /// 基于已读取的工作簿创建会话并完成一轮汇总
    pub fn from_workbook(
        source: impl AsRef<str>,
        workbook: Workbook,
        config: PipelineConfig,
    ) -> Self {
        Self::start(source, workbook, config, Utc::now())
    }

    /// started_at 由调用方在读取/汇总之前取得
    #[instrument(skip_all, fields(source = %source.as_ref()))]
    fn start(
        source: impl AsRef<str>,
        workbook: Workbook,
        config: PipelineConfig,
        started_at: DateTime<Utc>,
    ) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let rules = DefaultRulesClassifier::new(config.bai03_alias);
        let orchestrator = WorkbookOrchestrator::new(config);

        // === 步骤 1: 默认规则汇总 ===
        let initial = orchestrator.run_pass(&workbook, &rules);

        // === 步骤 2: 收集未分类设备 ===
        let unknown = UnknownDeviceCollector::new(rules).collect_unknown(&initial.outcomes);

        info!(
            session_id = %session_id,
            sheets = workbook.sheets.len(),
            unknown = unknown.len(),
            "会话一轮汇总完成"
        );

        Self {
            session_id,
            source: source.as_ref().to_string(),
            started_at,
            workbook,
            rules,
            orchestrator,
            overrides: OverrideTable::new(),
            unknown,
            initial,
            resolved: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &PipelineConfig {
        self.orchestrator.config()
    }

    /// 一轮汇总后默认规则无法分类的设备（去重、排序）
    pub fn unknown_devices(&self) -> &BTreeSet<String> {
        &self.unknown
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn phase(&self) -> SessionPhase {
        if self.resolved.is_some() {
            SessionPhase::Resolved
        } else {
            SessionPhase::Initial
        }
    }

    /// 当前结果（有二轮则取二轮）
    pub fn outcomes(&self) -> &[SheetOutcome] {
        match &self.resolved {
            Some(pass) => &pass.outcomes,
            None => &self.initial.outcomes,
        }
    }

    /// 一轮结果
    pub fn initial_outcomes(&self) -> &[SheetOutcome] {
        &self.initial.outcomes
    }

    /// 提交操作员选择并重新汇总
    ///
    /// # 说明
    /// - "unselected" 不写入覆写表
    /// - 有新覆写时才触发二轮,二轮从原始工作簿开始
    ///
    /// # 返回
    /// 本次写入覆写表的条数
    #[instrument(skip_all, fields(session_id = %self.session_id))]
    pub fn apply_choices<I>(&mut self, choices: I) -> usize
    where
        I: IntoIterator<Item = (String, OverrideChoice)>,
    {
        let mut committed = 0;
        for (device, choice) in choices {
            if let OverrideChoice::Category(category) = choice {
                if self.overrides.insert(&device, category) {
                    committed += 1;
                }
            }
        }

        if committed == 0 {
            info!("无新覆写,保留一轮结果");
            return 0;
        }

        self.rerun();
        committed
    }

    /// 以当前覆写表重新执行二轮汇总
    pub fn rerun(&mut self) {
        let classifier = OverrideAwareClassifier::new(&self.overrides, self.rules);
        let pass = self.orchestrator.run_pass(&self.workbook, &classifier);
        info!(overrides = self.overrides.len(), "二轮汇总完成");
        self.resolved = Some(pass);
    }

    /// 导出当前结果
    pub fn export<P: AsRef<Path>>(&self, path: P) -> ApiResult<()> {
        WorkbookWriter::new(self.config().highlight_column.clone())
            .write(self.outcomes(), path)?;
        Ok(())
    }

    /// 生成会话报告
    pub fn report(&self) -> SessionReport {
        let sheets = self
            .outcomes()
            .iter()
            .map(|outcome| {
                let (groups, new_qty_total) = match outcome.processed() {
                    Some(sheet) => (
                        sheet.groups.len(),
                        sheet
                            .groups
                            .iter()
                            .fold(0i64, |acc, g| acc.saturating_add(g.new_qty)),
                    ),
                    None => (0, 0),
                };
                let missing_columns = match outcome {
                    SheetOutcome::Skipped { missing, .. } => missing.clone(),
                    _ => Vec::new(),
                };
                SheetReport {
                    name: outcome.name().to_string(),
                    status: outcome.status(),
                    rows: outcome.output_table().height(),
                    groups,
                    missing_columns,
                    new_qty_total,
                }
            })
            .collect();

        let unresolved_devices = self
            .unknown
            .iter()
            .filter(|device| self.overrides.lookup(device).is_none())
            .cloned()
            .collect();

        SessionReport {
            session_id: self.session_id.clone(),
            source: self.source.clone(),
            started_at: self.started_at,
            generated_at: Utc::now(),
            phase: self.phase(),
            config: self.config().clone(),
            sheets,
            unknown_devices: self.unknown.iter().cloned().collect(),
            overrides_applied: self.overrides.clone(),
            unresolved_devices,
        }
    }

    /// 报告写出为 JSON 文件
    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> ApiResult<()> {
        let json = serde_json::to_string_pretty(&self.report())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, RawTable, SheetData};

    fn session() -> TallySession {
        let table = RawTable::new(
            vec!["Customer Code".into(), "Device".into(), "Qty".into()],
            vec![
                vec![CellValue::text("Acme"), CellValue::text("BAC-I 100"), CellValue::Int(5)],
                vec![CellValue::Empty, CellValue::text("Gizmo"), CellValue::Int(2)],
                vec![CellValue::Empty, CellValue::text("Widget"), CellValue::Int(1)],
            ],
        );
        let workbook = Workbook::new(vec![SheetData::new("Inventory", table)]);
        TallySession::from_workbook("memory", workbook, PipelineConfig::default())
    }

    #[test]
    fn test_override_choice_parse() {
        assert_eq!(
            "i-cab h".parse::<OverrideChoice>().unwrap(),
            OverrideChoice::Category(DeviceCategory::ICabH)
        );
        assert_eq!(" Unselected ".parse::<OverrideChoice>().unwrap(), OverrideChoice::Unselected);
        assert!(matches!(
            "whatever".parse::<OverrideChoice>(),
            Err(ApiError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_initial_pass_collects_unknowns() {
        let session = session();
        assert_eq!(session.phase(), SessionPhase::Initial);
        let unknown: Vec<&str> = session.unknown_devices().iter().map(|s| s.as_str()).collect();
        assert_eq!(unknown, vec!["Gizmo", "Widget"]);
        assert!(session.session_id().len() >= 32);
    }

    #[test]
    fn test_unselected_choices_do_not_rerun() {
        let mut session = session();
        let committed = session.apply_choices(vec![
            ("Gizmo".to_string(), OverrideChoice::Unselected),
            ("Widget".to_string(), OverrideChoice::Unselected),
        ]);
        assert_eq!(committed, 0);
        assert!(session.overrides().is_empty());
        assert_eq!(session.phase(), SessionPhase::Initial);
    }

    #[test]
    fn test_apply_choices_reruns_with_overrides() {
        let mut session = session();
        let committed = session.apply_choices(vec![
            ("Gizmo".to_string(), OverrideChoice::Category(DeviceCategory::ICabM)),
            ("Widget".to_string(), OverrideChoice::Unselected),
        ]);
        assert_eq!(committed, 1);
        assert_eq!(session.phase(), SessionPhase::Resolved);

        let group = &session.outcomes()[0].processed().unwrap().groups[0];
        assert_eq!(group.totals.get(DeviceCategory::BacI), 5);
        assert_eq!(group.totals.get(DeviceCategory::ICabM), 2);
        assert_eq!(group.new_qty, 7);

        // 一轮结果保持不变
        let initial = &session.initial_outcomes()[0].processed().unwrap().groups[0];
        assert_eq!(initial.new_qty, 5);

        let report = session.report();
        assert_eq!(report.phase, SessionPhase::Resolved);
        assert_eq!(report.unresolved_devices, vec!["Widget".to_string()]);
        assert_eq!(report.sheets[0].new_qty_total, 7);
        assert_eq!(report.overrides_applied.lookup("Gizmo"), Some(DeviceCategory::ICabM));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = session().report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["phase"], "INITIAL");
        assert_eq!(json["sheets"][0]["status"], "PROCESSED");
        assert_eq!(json["unknown_devices"][1], "Widget");
    }

    #[test]
    fn test_started_at_taken_before_first_pass() {
        let started_at = Utc::now() - chrono::Duration::seconds(30);
        let workbook = session().workbook.clone();
        let session = TallySession::start("memory", workbook, PipelineConfig::default(), started_at);
        let report = session.report();
        assert_eq!(report.started_at, started_at);
        assert!(report.generated_at >= report.started_at);
    }

    #[test]
    fn test_open_records_start_before_import() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("list.csv");
        std::fs::write(&path, "Customer Code,Device,Qty\nAcme,BAC-I,1\n").unwrap();

        let before = Utc::now();
        let session = TallySession::open(&path, PipelineConfig::default()).unwrap();
        let report = session.report();
        assert!(report.started_at >= before);
        assert!(report.started_at <= report.generated_at);
    }
}
