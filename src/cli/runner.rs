//! 命令计时包装器
//!
//! 执行处理器并测量耗时；成功时上报耗时，失败时上报错误。

use crate::error::Result;
use crate::reporter::Reporter;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// 一次命令执行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 成功，附带耗时
    Succeeded(Duration),
    /// 失败，错误已上报
    Failed,
}

impl Outcome {
    /// 是否成功
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    /// 进程退出码
    ///
    /// 命令本身成功但上报器锁存了错误时同样返回 1。
    pub fn exit_code(&self, reporter: &Reporter) -> u8 {
        if self.is_success() && !reporter.has_errored() {
            0
        } else {
            1
        }
    }
}

/// 格式化耗时：不少于 1 秒时保留一位小数的秒，否则为整毫秒
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_secs_f64() * 1000.0;
    if millis >= 1000.0 {
        format!("{:.1}s", millis / 1000.0)
    } else {
        format!("{}ms", millis.round() as u64)
    }
}

/// 以计时方式执行处理器
///
/// # 参数
/// * `label` - 成功日志中的动作名，如 `building`
/// * `reporter` - 上报器
/// * `task` - 处理器返回的 future
pub async fn run<F>(label: &str, reporter: &Reporter, task: F) -> Outcome
where
    F: Future<Output = Result<()>>,
{
    debug!("Start {label}");
    let start = Instant::now();

    match task.await {
        Ok(()) => {
            let elapsed = start.elapsed();
            debug!("Stop {label}");
            reporter.success(format!("Finished {label} in {}", format_duration(elapsed)));
            Outcome::Succeeded(elapsed)
        }
        Err(e) => {
            reporter.error(e);
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HandlerError, SirocError};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.0s");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_micros(1_400)), "1ms");
        assert_eq!(format_duration(Duration::from_secs(62)), "62.0s");
    }

    #[tokio::test]
    async fn test_success_is_timed() {
        let reporter = Reporter::new();
        let outcome = run("building", &reporter, async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        })
        .await;

        match outcome {
            Outcome::Succeeded(elapsed) => assert!(elapsed >= Duration::from_millis(20)),
            Outcome::Failed => panic!("expected success"),
        }
        assert_eq!(outcome.exit_code(&reporter), 0);
        assert!(!reporter.has_errored());

        let line = reporter.last_success().unwrap();
        let elapsed = line.strip_prefix("Finished building in ").unwrap();
        assert!(elapsed.ends_with("ms") || elapsed.ends_with('s'), "{line}");
    }

    #[tokio::test]
    async fn test_success_line_uses_label() {
        let reporter = Reporter::new();
        run("generating changelog", &reporter, async { Ok(()) }).await;

        let line = reporter.last_success().unwrap();
        assert!(line.starts_with("Finished generating changelog in "), "{line}");
        assert!(line.ends_with("ms"), "{line}");
    }

    #[tokio::test]
    async fn test_failure_reports_exactly_one_error() {
        let reporter = Reporter::new();
        let outcome = run("building", &reporter, async {
            Err(SirocError::from(HandlerError::NotConfigured {
                command: "build".into(),
            }))
        })
        .await;

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(outcome.exit_code(&reporter), 1);
        assert_eq!(reporter.error_count(), 1);
        assert!(reporter.last_success().is_none());
    }

    #[tokio::test]
    async fn test_latched_error_fails_successful_outcome() {
        let reporter = Reporter::new();
        let handle = reporter.clone();
        let outcome = run("running", &reporter, async move {
            handle.error("background task failed");
            Ok(())
        })
        .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.exit_code(&reporter), 1);
    }
}
