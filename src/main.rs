//! siroc 主程序入口

use anyhow::Context;
use siroc::cli::run_app;
use siroc::config::resolve_root_dir;
use siroc::handlers::ProcessHandlers;
use siroc::logging::{LogConfig, LoggingSystem};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            // 日志系统可能尚未就绪，直接写 stderr
            eprintln!("{}: {e:#}", siroc::APP_NAME);
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<u8> {
    // 日志系统必须先于根包加载就绪
    LoggingSystem::setup_logging(&LogConfig::from_env()).context("初始化日志系统失败")?;

    debug!("{} v{} 启动", siroc::APP_NAME, siroc::VERSION);

    let root_dir = resolve_root_dir().context("无法确定根目录")?;
    let exit = run_app(std::env::args_os(), &root_dir, Arc::new(ProcessHandlers::new())).await;

    debug!("退出码 {}，错误 {} 个", exit.code, exit.errors);
    Ok(exit.code)
}
