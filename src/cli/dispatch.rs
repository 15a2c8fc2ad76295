//! 命令分发
//!
//! 把解析后的调用交给对应处理器，并在独立任务中执行，
//! 处理器中逃逸的 panic 会被捕获、上报并视为失败。

use crate::cli::registry::ParsedInvocation;
use crate::cli::runner::{run, Outcome};
use crate::config::RootContext;
use crate::error::{HandlerError, Result};
use crate::handlers::Handlers;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// 调用处理器
async fn invoke(
    handlers: &dyn Handlers,
    ctx: &RootContext,
    invocation: ParsedInvocation,
) -> Result<()> {
    match invocation {
        ParsedInvocation::Build(options) => handlers.build(ctx, options).await,
        ParsedInvocation::Dev(options) => handlers.dev(ctx, options).await,
        ParsedInvocation::Run(options) => handlers.run(ctx, options).await,
        ParsedInvocation::Changelog => handlers.changelog(ctx).await,
        ParsedInvocation::Custom(command) => handlers.custom(ctx, &command).await,
    }
}

/// 分发一次命令调用
pub async fn dispatch(
    ctx: Arc<RootContext>,
    handlers: Arc<dyn Handlers>,
    invocation: ParsedInvocation,
) -> Outcome {
    let label = invocation.label();
    let reporter = ctx.reporter.clone();
    debug!("分发命令: {label}");

    let task_label = label.clone();
    let task = tokio::spawn(async move {
        let reporter = ctx.reporter.clone();
        run(
            &task_label,
            &reporter,
            invoke(handlers.as_ref(), &ctx, invocation),
        )
        .await
    });

    match task.await {
        Ok(outcome) => outcome,
        Err(join_error) => {
            let message = if join_error.is_panic() {
                panic_message(join_error.into_panic())
            } else {
                "task was cancelled".to_string()
            };
            reporter.error(HandlerError::Panicked {
                command: label,
                message,
            });
            Outcome::Failed
        }
    }
}

/// 提取 panic 信息
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42_u8)), "unknown panic");
    }
}
