//! 命令上报器
//!
//! 根上下文持有的日志句柄，提供 success/warn/error 三个面向用户的出口，
//! 并记录本次进程中是否出现过错误。

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, warn};

/// 命令上报器
///
/// 克隆后的句柄共享同一个错误锁存器，因此处理器派生出的异步任务
/// 上报的错误同样会影响最终退出码。
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    errored: Arc<AtomicBool>,
    error_count: Arc<AtomicUsize>,
    last_success: Arc<Mutex<Option<String>>>,
}

impl Reporter {
    /// 创建新的上报器
    pub fn new() -> Self {
        Self::default()
    }

    /// 上报成功信息
    pub fn success(&self, message: impl Display) {
        let message = message.to_string();
        info!("✔ {message}");
        *self
            .last_success
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message);
    }

    /// 上报警告
    pub fn warn(&self, message: impl Display) {
        warn!("⚠ {message}");
    }

    /// 上报错误并锁存错误状态
    pub fn error(&self, message: impl Display) {
        self.errored.store(true, Ordering::SeqCst);
        self.error_count.fetch_add(1, Ordering::SeqCst);
        error!("✖ {message}");
    }

    /// 本进程是否上报过错误
    pub fn has_errored(&self) -> bool {
        self.errored.load(Ordering::SeqCst)
    }

    /// 已上报的错误数量
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::SeqCst)
    }

    /// 最近一次上报的成功信息
    pub fn last_success(&self) -> Option<String> {
        self.last_success
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
