// ==========================================
// 设备台账分类汇总 - 命令行入口
// ==========================================
// 职责: 参数解析、会话驱动、操作员提示输出
// 说明: 业务逻辑全部在 api/engine 层,这里只做胶水
// ==========================================

use crate::api::{SessionReport, TallySession};
use crate::app::prompt::{ChoiceProvider, DialoguerPrompt, JsonAnswerFile};
use crate::config::{ConfigManager, PipelineConfigReader};
use crate::domain::{SheetOutcome, SheetStatus};
use crate::i18n::{self, t_with_args};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Classify devices and tally quantities per customer across every sheet of a workbook.
#[derive(Parser, Debug)]
#[clap(
    name = "device-tally",
    version,
    about = "Classify device inventory rows and tally quantities per customer"
)]
pub struct Cli {
    /// Input workbook (.xlsx/.xlsm/.xlsb/.xls/.ods/.csv)
    pub input: PathBuf,

    /// Output xlsx path (default: <input-stem>_processed.xlsx next to the input)
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// JSON answer file for unclassified devices, used instead of the prompt
    #[clap(long)]
    pub overrides: Option<PathBuf>,

    /// Skip interactive resolution of unclassified devices
    #[clap(long)]
    pub no_prompt: bool,

    /// Write a JSON session report to this path
    #[clap(long)]
    pub report: Option<PathBuf>,

    /// Operator message language (en | zh-CN)
    #[clap(long, default_value = "zh-CN")]
    pub lang: String,

    /// Emit JSON log lines
    #[clap(long)]
    pub log_json: bool,
}

/// 默认输出路径: 与输入同目录的 `<stem>_processed.xlsx`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "workbook".to_string());
    input.with_file_name(format!("{}_processed.xlsx", stem))
}

/// CLI 主流程
pub fn run(cli: Cli) -> Result<SessionReport> {
    if i18n::set_locale(&cli.lang).is_none() {
        tracing::warn!(lang = %cli.lang, "不支持的语言,保持默认");
    }

    // === 步骤 1: 读取配置并打开会话 ===
    let config = ConfigManager::from_env().snapshot();
    tracing::info!(?config, input = %cli.input.display(), "开始处理");

    let mut session = TallySession::open(&cli.input, config)
        .with_context(|| format!("无法读取输入文件: {}", cli.input.display()))?;

    for outcome in session.initial_outcomes() {
        print_sheet_notice(outcome);
    }

    // === 步骤 2: 未分类设备处理 ===
    let unknown = session.unknown_devices().clone();
    if !unknown.is_empty() {
        println!(
            "{}",
            t_with_args("cli.unknown_found", &[("count", unknown.len().to_string().as_str())])
        );

        let choices = match (&cli.overrides, cli.no_prompt) {
            (Some(path), _) => {
                let mut answers = JsonAnswerFile::load(path)
                    .with_context(|| format!("无法读取覆写答复文件: {}", path.display()))?;
                Some(answers.choose(&unknown)?)
            }
            (None, true) => None,
            (None, false) if !std::io::stdin().is_terminal() => {
                println!("{}", i18n::t("cli.prompt_unavailable"));
                None
            }
            (None, false) => match DialoguerPrompt.choose(&unknown) {
                Ok(choices) => Some(choices),
                Err(e) => {
                    tracing::warn!(error = %e, "交互选择中断,保留一轮结果");
                    None
                }
            },
        };

        let committed = choices.map(|c| session.apply_choices(c)).unwrap_or(0);
        if committed > 0 {
            println!(
                "{}",
                t_with_args("cli.overrides_applied", &[("count", committed.to_string().as_str())])
            );
        } else {
            println!("{}", i18n::t("cli.no_overrides"));
        }
    }

    // === 步骤 3: 导出 ===
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    session
        .export(&output)
        .with_context(|| format!("无法写出结果文件: {}", output.display()))?;
    println!(
        "{}",
        t_with_args("cli.exported", &[("path", output.display().to_string().as_str())])
    );

    // === 步骤 4: 报告 ===
    if let Some(path) = &cli.report {
        session
            .write_report(path)
            .with_context(|| format!("无法写出会话报告: {}", path.display()))?;
        println!(
            "{}",
            t_with_args("cli.report_written", &[("path", path.display().to_string().as_str())])
        );
    }

    let report = session.report();
    print_summary(&report);
    Ok(report)
}

fn print_sheet_notice(outcome: &SheetOutcome) {
    match outcome {
        SheetOutcome::Skipped { name, missing, .. } => {
            let missing = missing
                .iter()
                .map(|role| role.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "{}",
                t_with_args("cli.sheet_skipped", &[("sheet", name.as_str()), ("missing", missing.as_str())])
            );
        }
        SheetOutcome::Excluded { name, .. } => {
            println!("{}", t_with_args("cli.sheet_excluded", &[("sheet", name.as_str())]));
        }
        SheetOutcome::Processed { .. } => {}
    }
}

fn print_summary(report: &SessionReport) {
    let count = |status: SheetStatus| {
        report
            .sheets
            .iter()
            .filter(|s| s.status == status)
            .count()
            .to_string()
    };
    println!(
        "{}",
        t_with_args(
            "cli.summary",
            &[
                ("sheets", report.sheets.len().to_string().as_str()),
                ("processed", count(SheetStatus::Processed).as_str()),
                ("skipped", count(SheetStatus::Skipped).as_str()),
                ("excluded", count(SheetStatus::Excluded).as_str()),
            ],
        )
    );
}
