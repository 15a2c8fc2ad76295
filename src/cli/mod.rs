//! 命令行接口模块
//!
//! 提供参数解析、命令注册、计时执行和分发功能

pub mod app;
pub mod args;
pub mod dispatch;
pub mod registry;
pub mod runner;

// 重新导出主要类型
pub use app::{run_app, AppExit};
pub use args::{Args, BuildArgs, Commands, RunArgs};
pub use dispatch::dispatch;
pub use registry::{CommandRegistry, ParsedInvocation};
pub use runner::{format_duration, run, Outcome};
