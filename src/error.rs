//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use std::path::PathBuf;
use thiserror::Error;

/// siroc 的主要错误类型
#[derive(Error, Debug)]
pub enum SirocError {
    /// 根包加载错误（启动阶段）
    #[error("Couldn't load package: {0}")]
    Manifest(#[from] ManifestError),

    /// 命令处理器错误
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// JSON序列化/反序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 根包清单错误类型
#[derive(Error, Debug)]
pub enum ManifestError {
    /// 清单文件不存在
    #[error("no package.json found in {}", path.display())]
    NotFound { path: PathBuf },

    /// 清单文件读取失败
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 清单文件解析失败
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// 环境变量替换失败
    #[error("environment variable `{var}` referenced in siroc.toml is not set")]
    EnvVar { var: String },

    /// 自定义命令定义无效
    #[error("invalid custom command `{name}`: {reason}")]
    InvalidCommand { name: String, reason: String },

    /// 自定义命令与内置命令重名
    #[error("custom command `{name}` collides with the built-in `{name}` command")]
    DuplicateCommand { name: String },
}

/// 命令处理器错误类型
#[derive(Error, Debug)]
pub enum HandlerError {
    /// 未配置外部处理器
    #[error("no `{command}` handler configured, add one under [handlers] in siroc.toml")]
    NotConfigured { command: String },

    /// 子进程启动失败
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// 子进程以非零状态退出
    #[error("`{program}` exited with {status}")]
    ExitStatus { program: String, status: String },

    /// 工作区解析失败
    #[error("failed to resolve workspace `{pattern}`: {reason}")]
    Workspace { pattern: String, reason: String },

    /// 没有可执行的工作区
    #[error("no workspace packages found")]
    NoWorkspaces,

    /// 处理器运行中发生 panic
    #[error("`{command}` panicked: {message}")]
    Panicked { command: String, message: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, SirocError>;
