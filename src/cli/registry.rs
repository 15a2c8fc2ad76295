//! 命令注册表
//!
//! 在 clap 派生的内置命令之上追加版本参数、示例文本和自定义命令，
//! 并把解析结果转换为一次具体的命令调用。

use crate::cli::args::{Args, Commands};
use crate::config::{CustomCommand, RootPackage};
use crate::error::ManifestError;
use crate::handlers::{BuildOptions, DevOptions, RunOptions};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command, CommandFactory, FromArgMatches};
use std::ffi::OsString;

/// 与自定义命令冲突时拒绝注册的保留名
const RESERVED_COMMANDS: &[&str] = &["help"];

/// 一次解析后的命令调用
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedInvocation {
    /// `build` 或不带子命令
    Build(BuildOptions),
    /// `dev`
    Dev(DevOptions),
    /// `run`
    Run(RunOptions),
    /// `changelog`
    Changelog,
    /// 自定义命令
    Custom(CustomCommand),
}

impl ParsedInvocation {
    /// 计时日志中使用的名称
    pub fn label(&self) -> String {
        match self {
            ParsedInvocation::Build(_) => "building".to_string(),
            ParsedInvocation::Dev(_) => "stubbing".to_string(),
            ParsedInvocation::Run(_) => "running".to_string(),
            ParsedInvocation::Changelog => "generating changelog".to_string(),
            ParsedInvocation::Custom(command) => command.name.clone(),
        }
    }
}

/// 命令注册表
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    /// 完整的 clap 命令树
    command: Command,
    /// 已注册的自定义命令，保持注册顺序
    custom: Vec<CustomCommand>,
}

impl CommandRegistry {
    /// 创建只包含内置命令的注册表
    ///
    /// # 参数
    /// * `example_project` - 帮助示例中使用的包名
    pub fn new(example_project: &str) -> Self {
        let bin = crate::APP_NAME;
        let build_examples =
            format!("Examples:\n  {bin} build\n  {bin} build {example_project} -w");
        let dev_examples = format!("Examples:\n  {bin} dev\n  {bin} dev {example_project}");
        let run_examples = format!("Examples:\n  {bin} run src/test.ts\n  {bin} run --workspaces ls");

        let command = Args::command()
            .arg(
                Arg::new("version")
                    .short('v')
                    .long("version")
                    .action(ArgAction::Version)
                    .help("Display version number"),
            )
            .after_help(build_examples.clone())
            .mut_subcommand("build", |c| c.after_help(build_examples))
            .mut_subcommand("dev", |c| c.after_help(dev_examples))
            .mut_subcommand("run", |c| c.after_help(run_examples));

        Self {
            command,
            custom: Vec::new(),
        }
    }

    /// 根据根包创建注册表，并按声明顺序注册其自定义命令
    pub fn from_package(package: &RootPackage) -> Result<Self, ManifestError> {
        let mut registry = Self::new(package.display_name());
        for command in &package.commands {
            registry.register_custom(command.clone(), package.display_name())?;
        }
        Ok(registry)
    }

    /// 注册一个自定义命令
    ///
    /// 与内置命令或已注册命令重名时返回错误，不做覆盖。
    pub fn register_custom(
        &mut self,
        command: CustomCommand,
        owner: &str,
    ) -> Result<(), ManifestError> {
        if self.is_registered(&command.name) {
            return Err(ManifestError::DuplicateCommand { name: command.name });
        }

        let subcommand =
            Command::new(command.name.clone()).about(format!("Custom command ({owner})"));
        self.command = std::mem::take(&mut self.command).subcommand(subcommand);
        self.custom.push(command);
        Ok(())
    }

    /// 命令名是否已被占用
    pub fn is_registered(&self, name: &str) -> bool {
        RESERVED_COMMANDS.contains(&name) || self.command.find_subcommand(name).is_some()
    }

    /// 已注册的自定义命令
    pub fn custom_commands(&self) -> &[CustomCommand] {
        &self.custom
    }

    /// 生成完整的帮助文本
    pub fn render_help(&self) -> String {
        self.command.clone().render_help().to_string()
    }

    /// 解析命令行参数
    ///
    /// `--help` 与 `--version` 以 [`clap::error::ErrorKind::DisplayHelp`] /
    /// [`clap::error::ErrorKind::DisplayVersion`] 错误返回，由调用方决定输出与退出码。
    pub fn parse<I, T>(&self, argv: I) -> Result<ParsedInvocation, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut matches = self.command.clone().try_get_matches_from(argv)?;

        if let Some(name) = matches.subcommand_name() {
            if let Some(custom) = self.custom.iter().find(|c| c.name == name) {
                return Ok(ParsedInvocation::Custom(custom.clone()));
            }
        }

        let args = Args::from_arg_matches_mut(&mut matches)?;
        self.invocation(args)
    }

    /// 把派生参数转换为命令调用
    fn invocation(&self, args: Args) -> Result<ParsedInvocation, clap::Error> {
        let invocation = match args.command {
            None => ParsedInvocation::Build(args.build.into()),
            Some(Commands::Build(build)) => ParsedInvocation::Build(build.into()),
            Some(Commands::Dev { packages }) => ParsedInvocation::Dev(DevOptions { packages }),
            Some(Commands::Run(run)) => match run.into_options() {
                Some(options) => ParsedInvocation::Run(options),
                None => {
                    let mut run = self
                        .command
                        .find_subcommand("run")
                        .cloned()
                        .unwrap_or_else(|| self.command.clone());
                    return Err(run.error(
                        ErrorKind::MissingRequiredArgument,
                        "the following required arguments were not provided:\n  <file>",
                    ));
                }
            },
            Some(Commands::Changelog) => ParsedInvocation::Changelog,
        };
        Ok(invocation)
    }
}
