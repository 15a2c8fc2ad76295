//! 基于子进程的默认处理器
//!
//! 内置命令委托给 `siroc.toml` 中 `[handlers]` 配置的外部程序，
//! `run` 直接启动脚本或程序，自定义命令按声明的形式执行。

use crate::config::{CustomCommand, HandlerSpec, RootContext};
use crate::error::{HandlerError, Result};
use crate::handlers::{BuildOptions, DevOptions, Handlers, RunOptions};
use crate::workspace::resolve_workspaces;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 传给外部处理器的选项对象（JSON）
pub const OPTIONS_ENV: &str = "SIROC_OPTIONS";

/// 传给外部处理器的根包名
pub const PACKAGE_ENV: &str = "SIROC_PACKAGE";

/// 一次待执行的子进程调用
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// 程序
    pub program: String,
    /// 参数
    pub args: Vec<String>,
    /// 工作目录
    pub cwd: PathBuf,
    /// 额外的环境变量
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    /// 根据处理器定义创建调用
    pub fn from_spec(spec: &HandlerSpec, cwd: &Path) -> Self {
        let (program, args) = match spec {
            HandlerSpec::Shell(command) => shell_command(command),
            HandlerSpec::Argv(argv) => match argv.split_first() {
                Some((program, args)) => (program.clone(), args.to_vec()),
                None => (String::new(), Vec::new()),
            },
        };
        Self {
            program,
            args,
            cwd: cwd.to_path_buf(),
            envs: Vec::new(),
        }
    }

    /// 追加参数
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// 追加环境变量
    pub fn with_env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.envs.push((key.to_string(), value.into()));
        self
    }

    /// 启动子进程并等待退出
    pub async fn execute(&self) -> std::result::Result<(), HandlerError> {
        debug!(
            "执行 {} {} (cwd: {})",
            self.program,
            self.args.join(" "),
            self.cwd.display()
        );

        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .await
            .map_err(|source| HandlerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(HandlerError::ExitStatus {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// 系统 shell 调用
fn shell_command(command: &str) -> (String, Vec<String>) {
    if cfg!(windows) {
        ("cmd".to_string(), vec!["/C".to_string(), command.to_string()])
    } else {
        ("sh".to_string(), vec!["-c".to_string(), command.to_string()])
    }
}

/// 基于子进程的处理器
#[derive(Debug, Clone, Default)]
pub struct ProcessHandlers;

impl ProcessHandlers {
    /// 创建处理器
    pub fn new() -> Self {
        Self
    }

    /// 为配置的外部处理器构造调用
    pub fn delegate<T: Serialize>(
        ctx: &RootContext,
        command: &str,
        spec: Option<&HandlerSpec>,
        packages: &[String],
        options: &T,
    ) -> Result<Invocation> {
        let spec = spec.ok_or_else(|| HandlerError::NotConfigured {
            command: command.to_string(),
        })?;
        debug!("{} 委托给: {}", command, spec.display());

        Ok(Invocation::from_spec(spec, ctx.root_dir())
            .with_args(packages.iter().cloned())
            .with_env(OPTIONS_ENV, serde_json::to_string(options)?)
            .with_env(PACKAGE_ENV, ctx.package.display_name()))
    }

    /// 为 `run` 在指定目录下构造调用
    pub fn run_invocation(ctx: &RootContext, options: &RunOptions, cwd: &Path) -> Invocation {
        let run_config = &ctx.package.options.run;
        let (program, args) = if run_config.is_script(&options.file) {
            let mut args = vec![options.file.clone()];
            args.extend(options.args.iter().cloned());
            (run_config.runner.clone(), args)
        } else {
            (options.file.clone(), options.args.clone())
        };

        Invocation {
            program,
            args,
            cwd: cwd.to_path_buf(),
            envs: vec![(PACKAGE_ENV.to_string(), ctx.package.display_name().to_string())],
        }
    }

    /// `run` 的目标目录
    pub async fn run_targets(ctx: &RootContext, options: &RunOptions) -> Result<Vec<PathBuf>> {
        if !options.workspaces {
            return Ok(vec![ctx.root_dir().to_path_buf()]);
        }

        let patterns = ctx
            .package
            .manifest
            .workspaces
            .as_ref()
            .map(|w| w.patterns().to_vec())
            .unwrap_or_default();
        let targets = resolve_workspaces(ctx.root_dir(), &patterns).await?;

        if targets.is_empty() {
            return Err(HandlerError::NoWorkspaces.into());
        }
        Ok(targets)
    }
}

#[async_trait]
impl Handlers for ProcessHandlers {
    async fn build(&self, ctx: &RootContext, options: BuildOptions) -> Result<()> {
        let spec = ctx.package.options.handlers.build.as_ref();
        let invocation = Self::delegate(ctx, "build", spec, &options.packages, &options)?;
        Ok(invocation.execute().await?)
    }

    async fn dev(&self, ctx: &RootContext, options: DevOptions) -> Result<()> {
        let spec = ctx.package.options.handlers.dev.as_ref();
        let invocation = Self::delegate(ctx, "dev", spec, &options.packages, &options)?;
        Ok(invocation.execute().await?)
    }

    async fn run(&self, ctx: &RootContext, options: RunOptions) -> Result<()> {
        let targets = Self::run_targets(ctx, &options).await?;
        let invocations: Vec<_> = targets
            .iter()
            .map(|dir| Self::run_invocation(ctx, &options, dir))
            .collect();

        if options.sequential || invocations.len() == 1 {
            for invocation in &invocations {
                invocation.execute().await?;
            }
            return Ok(());
        }

        let results = join_all(invocations.iter().map(|invocation| invocation.execute())).await;

        let mut first_error = None;
        for (invocation, result) in invocations.iter().zip(results) {
            if let Err(e) = result {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    ctx.reporter
                        .warn(format!("{} failed: {}", invocation.cwd.display(), e));
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    async fn changelog(&self, ctx: &RootContext) -> Result<()> {
        let spec = ctx.package.options.handlers.changelog.as_ref();
        let invocation = Self::delegate(ctx, "changelog", spec, &[], &serde_json::json!({}))?;
        Ok(invocation.execute().await?)
    }

    async fn custom(&self, ctx: &RootContext, command: &CustomCommand) -> Result<()> {
        let invocation = Invocation::from_spec(&command.handler, ctx.root_dir())
            .with_env(PACKAGE_ENV, ctx.package.display_name());
        Ok(invocation.execute().await?)
    }
}
