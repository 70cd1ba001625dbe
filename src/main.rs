// ==========================================
// 设备台账分类汇总 - 命令行主入口
// ==========================================
// 退出码: 仅输入不可读/输出不可写时非零
// ==========================================

use anyhow::Result;
use clap::Parser;
use device_tally::app::{run, Cli};
use device_tally::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!(
        version = device_tally::VERSION,
        "{} 启动",
        device_tally::APP_NAME
    );

    let result = run(cli);
    match &result {
        Ok(report) => tracing::info!(session_id = %report.session_id, "处理完成"),
        Err(e) => tracing::error!(error = %e, "处理失败"),
    }
    result.map(|_| ())
}
