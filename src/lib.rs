//! siroc - 零配置 JavaScript/TypeScript 包构建工具的命令行入口
//!
//! 本库只负责命令行层：
//! - 解析参数并匹配内置命令与自定义命令
//! - 加载根包清单（`package.json` 与可选的 `siroc.toml`）
//! - 以计时包装器执行命令处理器并统一上报错误
//!
//! 实际的打包、存根生成和脚本执行由外部处理器完成。

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod reporter;
pub mod workspace;

// 重新导出主要类型
pub use config::{RootContext, RootPackage, SirocOptions};
pub use error::{HandlerError, ManifestError, SirocError};
pub use handlers::{Handlers, ProcessHandlers};
pub use reporter::Reporter;

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
