//! 应用程序核心流程
//!
//! 加载根包 → 注册命令 → 解析参数 → 分发 → 计算唯一的退出码。

use crate::cli::dispatch::dispatch;
use crate::cli::registry::CommandRegistry;
use crate::config::RootContext;
use crate::error::SirocError;
use crate::handlers::Handlers;
use crate::reporter::Reporter;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// 一次进程调用的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppExit {
    /// 进程退出码
    pub code: u8,
    /// 本次调用上报的错误数量
    pub errors: usize,
}

impl AppExit {
    fn new(code: u8, reporter: &Reporter) -> Self {
        Self {
            code,
            errors: reporter.error_count(),
        }
    }
}

/// 执行一次完整的命令行调用
///
/// # 参数
/// * `argv` - 包含程序名的参数列表
/// * `root_dir` - 根包所在目录
/// * `handlers` - 命令处理器
///
/// # 返回
/// * `AppExit` - 退出码：成功、帮助与版本为 0，其余失败均为 1
pub async fn run_app<I, T>(argv: I, root_dir: &Path, handlers: Arc<dyn Handlers>) -> AppExit
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let start = Instant::now();
    let ctx = match RootContext::load(root_dir).await {
        Ok(ctx) => ctx,
        Err(e) => {
            let reporter = Reporter::new();
            reporter.error(SirocError::from(e));
            return AppExit::new(1, &reporter);
        }
    };
    debug!("load root package: {:?}", start.elapsed());

    let start = Instant::now();
    let registry = match CommandRegistry::from_package(&ctx.package) {
        Ok(registry) => registry,
        Err(e) => {
            ctx.reporter.error(SirocError::from(e));
            return AppExit::new(1, &ctx.reporter);
        }
    };
    debug!("load CLI: {:?}", start.elapsed());

    let invocation = match registry.parse(argv) {
        Ok(invocation) => invocation,
        Err(e) => return AppExit::new(report_parse_error(&e, &ctx.reporter), &ctx.reporter),
    };

    let ctx = Arc::new(ctx);
    let reporter = ctx.reporter.clone();
    let outcome = dispatch(ctx, handlers, invocation).await;

    AppExit::new(outcome.exit_code(&reporter), &reporter)
}

/// 输出解析结果（帮助、版本或用法错误）并返回退出码
fn report_parse_error(error: &clap::Error, reporter: &Reporter) -> u8 {
    match error.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = error.print();
            0
        }
        _ => {
            let _ = error.print();
            reporter.error(format!("invalid arguments ({})", error.kind()));
            1
        }
    }
}
