//! 配置数据结构定义
//!
//! 定义根包清单、siroc 选项以及自定义命令的结构和验证逻辑

use crate::error::ManifestError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// `package.json` 中 siroc 关心的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    /// 包名
    pub name: Option<String>,
    /// 版本号
    pub version: Option<String>,
    /// yarn 工作区定义
    #[serde(default)]
    pub workspaces: Option<Workspaces>,
}

/// yarn 工作区定义，支持数组和 `{ "packages": [...] }` 两种写法
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Workspaces {
    /// `"workspaces": ["packages/*"]`
    List(Vec<String>),
    /// `"workspaces": { "packages": ["packages/*"] }`
    Detailed {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl Workspaces {
    /// 工作区匹配模式
    pub fn patterns(&self) -> &[String] {
        match self {
            Workspaces::List(patterns) => patterns,
            Workspaces::Detailed { packages } => packages,
        }
    }
}

/// 外部处理器定义
///
/// 字符串形式交给系统 shell 执行，数组形式直接作为程序和参数启动。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HandlerSpec {
    /// `lint = "eslint --fix ."`
    Shell(String),
    /// `lint = ["eslint", "--fix", "."]`
    Argv(Vec<String>),
}

impl HandlerSpec {
    /// 检查处理器定义是否可执行
    pub fn validate(&self) -> Result<(), String> {
        match self {
            HandlerSpec::Shell(command) if command.trim().is_empty() => {
                Err("command string is empty".to_string())
            }
            HandlerSpec::Argv(argv) if argv.is_empty() => Err("argument list is empty".to_string()),
            HandlerSpec::Argv(argv) if argv[0].trim().is_empty() => {
                Err("program name is empty".to_string())
            }
            _ => Ok(()),
        }
    }

    /// 用于日志的可读形式
    pub fn display(&self) -> String {
        match self {
            HandlerSpec::Shell(command) => command.clone(),
            HandlerSpec::Argv(argv) => argv.join(" "),
        }
    }
}

/// 用户在 `[commands]` 中声明的自定义命令
#[derive(Debug, Clone, PartialEq)]
pub struct CustomCommand {
    /// 命令名
    pub name: String,
    /// 处理器
    pub handler: HandlerSpec,
}

/// 内置命令的外部处理器
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HandlersConfig {
    /// 打包处理器
    pub build: Option<HandlerSpec>,
    /// 存根生成处理器
    pub dev: Option<HandlerSpec>,
    /// 更新日志生成器
    pub changelog: Option<HandlerSpec>,
}

/// `run` 命令的配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// 执行脚本文件的程序
    #[serde(default = "default_runner")]
    pub runner: String,
    /// 交给 runner 执行的脚本扩展名
    #[serde(default = "default_script_extensions")]
    pub script_extensions: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            runner: default_runner(),
            script_extensions: default_script_extensions(),
        }
    }
}

impl RunConfig {
    /// 文件是否应该交给 runner 执行
    pub fn is_script(&self, file: &str) -> bool {
        std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.script_extensions
                    .iter()
                    .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

/// `siroc.toml` 的内容
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SirocOptions {
    /// 自定义命令表，保持声明顺序
    #[serde(default)]
    pub commands: toml::Table,
    /// 内置命令的外部处理器
    #[serde(default)]
    pub handlers: HandlersConfig,
    /// `run` 命令配置
    #[serde(default)]
    pub run: RunConfig,
}

// 默认值函数
fn default_runner() -> String {
    "node".to_string()
}
fn default_script_extensions() -> Vec<String> {
    ["js", "mjs", "cjs", "ts", "mts", "cts"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn command_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9:_.-]*$").expect("valid regex"))
}

impl SirocOptions {
    /// 按声明顺序返回验证后的自定义命令
    pub fn custom_commands(&self) -> Result<Vec<CustomCommand>, ManifestError> {
        self.commands
            .iter()
            .map(|(name, value)| {
                let invalid = |reason: String| ManifestError::InvalidCommand {
                    name: name.clone(),
                    reason,
                };

                if !command_name_regex().is_match(name) {
                    return Err(invalid(
                        "names must start with a letter or digit and contain no spaces".into(),
                    ));
                }

                let handler: HandlerSpec = value
                    .clone()
                    .try_into()
                    .map_err(|_| invalid("expected a string or an array of strings".into()))?;
                handler.validate().map_err(invalid)?;

                Ok(CustomCommand {
                    name: name.clone(),
                    handler,
                })
            })
            .collect()
    }

    /// 验证全部选项
    pub fn validate(&self) -> Result<(), ManifestError> {
        self.custom_commands()?;

        let handlers = [
            ("build", &self.handlers.build),
            ("dev", &self.handlers.dev),
            ("changelog", &self.handlers.changelog),
        ];
        for (name, handler) in handlers {
            if let Some(handler) = handler {
                handler
                    .validate()
                    .map_err(|reason| ManifestError::InvalidCommand {
                        name: format!("handlers.{name}"),
                        reason,
                    })?;
            }
        }

        if self.run.runner.trim().is_empty() {
            return Err(ManifestError::InvalidCommand {
                name: "run.runner".to_string(),
                reason: "runner is empty".to_string(),
            });
        }

        Ok(())
    }
}
