// ==========================================
// 考场座位编排引擎 - 命令行入口
// ==========================================
// 用法:
//   exam-seating <snapshot.json> [config.json]
//
// 读取 SeatingRequest 快照, 运行一次编排, 结果 JSON 输出到 stdout
// 退出码: 0 成功 / 1 编排失败 / 2 读取或解析错误
// ==========================================

use anyhow::{bail, Context};
use exam_seating::{logging, ConfigManager, SeatingEngine, SeatingRequest};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("错误: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// 返回编排是否成功
fn run() -> anyhow::Result<bool> {
    let mut args = std::env::args().skip(1);
    let Some(snapshot_path) = args.next().map(PathBuf::from) else {
        bail!("用法: exam-seating <snapshot.json> [config.json]");
    };
    let config_path = args.next().map(PathBuf::from);

    let raw = std::fs::read_to_string(&snapshot_path)
        .with_context(|| format!("无法读取快照文件 {}", snapshot_path.display()))?;
    let request: SeatingRequest = serde_json::from_str(&raw)
        .with_context(|| format!("快照文件格式错误 {}", snapshot_path.display()))?;

    let manager = ConfigManager::load(config_path.as_deref()).context("配置加载失败")?;
    let engine = SeatingEngine::from_reader(&manager).context("配置无效")?;

    tracing::info!(
        version = exam_seating::VERSION,
        snapshot = %snapshot_path.display(),
        config_source = ?manager.source(),
        "开始处理快照"
    );

    let outcome = engine.run(&request);
    tracing::info!(run_id = %outcome.run_id, "{}", outcome.summary(&engine.config().locale));

    let json = serde_json::to_string_pretty(&outcome).context("结果序列化失败")?;
    println!("{}", json);

    Ok(outcome.success)
}
