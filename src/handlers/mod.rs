//! 命令处理器模块
//!
//! 定义内置命令与自定义命令的处理器接口，以及各命令接收的选项对象。
//! 打包、存根生成、更新日志生成等实际工作由外部程序完成。

pub mod process;

use crate::config::{CustomCommand, RootContext};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

pub use process::ProcessHandlers;

/// `build` 命令的选项
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildOptions {
    /// 要构建的包，空表示全部
    pub packages: Vec<String>,
    /// 监听文件变化并重新构建
    pub watch: bool,
    /// 构建开发版本（仅 CJS）
    pub dev: bool,
    /// 输入文件
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// 输出文件
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// 输出格式
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// `dev` 命令的选项
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DevOptions {
    /// 要生成存根的包，空表示全部
    pub packages: Vec<String>,
}

/// `run` 命令的选项
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunOptions {
    /// 脚本文件或程序
    pub file: String,
    /// 透传给脚本的参数（包括未知的选项）
    pub args: Vec<String>,
    /// 在每个工作区包中执行
    pub workspaces: bool,
    /// 工作区逐个执行而不是并行
    pub sequential: bool,
}

/// 命令处理器trait
///
/// 每个方法都接收根上下文；错误由调用方的计时包装器统一上报。
#[async_trait]
pub trait Handlers: Send + Sync {
    /// 打包
    async fn build(&self, ctx: &RootContext, options: BuildOptions) -> Result<()>;

    /// 生成开发存根
    async fn dev(&self, ctx: &RootContext, options: DevOptions) -> Result<()>;

    /// 执行脚本
    async fn run(&self, ctx: &RootContext, options: RunOptions) -> Result<()>;

    /// 生成更新日志
    async fn changelog(&self, ctx: &RootContext) -> Result<()>;

    /// 执行自定义命令
    async fn custom(&self, ctx: &RootContext, command: &CustomCommand) -> Result<()>;
}
