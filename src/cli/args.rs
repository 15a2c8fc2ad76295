//! 命令行参数定义
//!
//! 使用clap定义内置命令；自定义命令在运行时由 [`CommandRegistry`](super::CommandRegistry) 追加。

use crate::handlers::{BuildOptions, RunOptions};
use clap::{Args as ClapArgs, Parser, Subcommand};

/// siroc - 零配置包构建工具
///
/// 不带子命令时等同于 `siroc build`。
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "siroc",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None,
    disable_version_flag = true,
    args_conflicts_with_subcommands = true
)]
pub struct Args {
    /// 默认命令（构建）的参数
    #[command(flatten)]
    pub build: BuildArgs,

    /// 子命令
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// `build` 的参数
#[derive(ClapArgs, Debug, Clone, Default, PartialEq)]
pub struct BuildArgs {
    /// 要构建的包
    #[arg(value_name = "PACKAGES", help = "Packages to bundle (all packages when omitted)")]
    pub packages: Vec<String>,

    /// 监听文件变化
    #[arg(short, long, help = "Watch files in bundle and rebuild on changes")]
    pub watch: bool,

    /// 开发构建
    #[arg(long, help = "Build development bundle (only CJS)")]
    pub dev: bool,

    /// 输入文件
    #[arg(short = 'i', value_name = "input", help = "Specify input file name")]
    pub input: Option<String>,

    /// 输出文件
    #[arg(short = 'o', value_name = "output", help = "Specify output file name")]
    pub output: Option<String>,

    /// 输出格式
    #[arg(short = 'f', value_name = "format", help = "Specify output file format")]
    pub format: Option<String>,
}

/// `run` 的参数
///
/// 未知选项可以出现在任意位置，连同文件之后的参数一起原样透传给脚本。
/// 第一个不以 `-` 开头的参数是要执行的文件；`-w`/`-s` 在任意位置都会被识别。
#[derive(ClapArgs, Debug, Clone, Default, PartialEq)]
pub struct RunArgs {
    /// 在所有工作区中执行
    #[arg(short, long, help = "Run command in all yarn workspaces")]
    pub workspaces: bool,

    /// 逐个执行
    #[arg(short, long, help = "Run sequentially rather than in parallel")]
    pub sequential: bool,

    /// 文件及透传参数
    #[arg(
        value_name = "file",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Script file or program to run, followed by arguments passed through to it"
    )]
    pub argv: Vec<String>,
}

impl RunArgs {
    /// 拆分出文件、透传参数和内置开关
    ///
    /// 没有文件时返回 `None`。
    pub fn into_options(self) -> Option<RunOptions> {
        let mut workspaces = self.workspaces;
        let mut sequential = self.sequential;
        let mut file = None;
        let mut args = Vec::new();

        for token in self.argv {
            match token.as_str() {
                "-w" | "--workspaces" => workspaces = true,
                "-s" | "--sequential" => sequential = true,
                _ if file.is_none() && !token.starts_with('-') => file = Some(token),
                _ => args.push(token),
            }
        }

        Some(RunOptions {
            file: file?,
            args,
            workspaces,
            sequential,
        })
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// 打包
    #[command(about = "Bundle input files")]
    Build(BuildArgs),

    /// 生成开发存根
    #[command(about = "Generate package stubs for quick development")]
    Dev {
        /// 要生成存根的包
        #[arg(value_name = "PACKAGES", help = "Packages to stub (all packages when omitted)")]
        packages: Vec<String>,
    },

    /// 执行脚本
    #[command(about = "Run Node script", override_usage = "siroc run [OPTIONS] <file> [args]...")]
    Run(RunArgs),

    /// 生成更新日志
    #[command(about = "Generate changelog")]
    Changelog,
}

impl From<BuildArgs> for BuildOptions {
    fn from(args: BuildArgs) -> Self {
        Self {
            packages: args.packages,
            watch: args.watch,
            dev: args.dev,
            input: args.input,
            output: args.output,
            format: args.format,
        }
    }
}
