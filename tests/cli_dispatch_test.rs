//! 命令行分发测试
//!
//! 使用记录调用的处理器验证解析、分发与退出码

use async_trait::async_trait;
use clap::error::ErrorKind;
use siroc::cli::{run_app, CommandRegistry};
use siroc::config::{CustomCommand, RootContext, RootPackage};
use siroc::error::{HandlerError, Result};
use siroc::handlers::{BuildOptions, DevOptions, Handlers, RunOptions};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 处理器收到的调用
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Build(BuildOptions),
    Dev(DevOptions),
    Run(RunOptions),
    Changelog,
    Custom { name: String, package: Option<String> },
}

/// 处理器行为
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Succeed,
    Fail,
    Panic,
}

struct RecordingHandlers {
    calls: Mutex<Vec<Call>>,
    mode: Mode,
}

impl RecordingHandlers {
    fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            mode,
        })
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.mode {
            Mode::Succeed => Ok(()),
            Mode::Fail => Err(HandlerError::ExitStatus {
                program: "rollup".into(),
                status: "exit status: 2".into(),
            }
            .into()),
            Mode::Panic => panic!("handler blew up"),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Handlers for RecordingHandlers {
    async fn build(&self, _ctx: &RootContext, options: BuildOptions) -> Result<()> {
        self.record(Call::Build(options))
    }

    async fn dev(&self, _ctx: &RootContext, options: DevOptions) -> Result<()> {
        self.record(Call::Dev(options))
    }

    async fn run(&self, _ctx: &RootContext, options: RunOptions) -> Result<()> {
        self.record(Call::Run(options))
    }

    async fn changelog(&self, _ctx: &RootContext) -> Result<()> {
        self.record(Call::Changelog)
    }

    async fn custom(&self, ctx: &RootContext, command: &CustomCommand) -> Result<()> {
        self.record(Call::Custom {
            name: command.name.clone(),
            package: ctx.package.name().map(str::to_string),
        })
    }
}

/// 创建测试项目
fn project(options: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name":"my-lib","version":"0.0.1"}"#,
    )
    .unwrap();
    fs::write(dir.path().join("siroc.toml"), options).unwrap();
    dir
}

async fn invoke(root: &Path, argv: &[&str], handlers: Arc<RecordingHandlers>) -> (u8, usize) {
    let mut full = vec!["siroc"];
    full.extend_from_slice(argv);
    let exit = run_app(full, root, handlers).await;
    (exit.code, exit.errors)
}

#[tokio::test]
async fn test_build_receives_packages_and_flags() {
    let dir = project("");
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let (code, errors) = invoke(dir.path(), &["build", "pkgA", "pkgB", "-w"], handlers.clone()).await;

    assert_eq!(code, 0);
    assert_eq!(errors, 0);
    assert_eq!(
        handlers.calls(),
        vec![Call::Build(BuildOptions {
            packages: vec!["pkgA".into(), "pkgB".into()],
            watch: true,
            dev: false,
            ..Default::default()
        })]
    );
}

#[tokio::test]
async fn test_default_command_builds_everything() {
    let dir = project("");
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let (code, _) = invoke(dir.path(), &[], handlers.clone()).await;

    assert_eq!(code, 0);
    assert_eq!(handlers.calls(), vec![Call::Build(BuildOptions::default())]);
}

#[tokio::test]
async fn test_missing_manifest_aborts_before_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let (code, errors) = invoke(dir.path(), &["build"], handlers.clone()).await;

    assert_eq!(code, 1);
    assert_eq!(errors, 1);
    assert!(handlers.calls().is_empty());
}

#[tokio::test]
async fn test_custom_command_receives_root_context() {
    let dir = project("[commands]\nlint = \"eslint .\"\n");
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let (code, _) = invoke(dir.path(), &["lint"], handlers.clone()).await;

    assert_eq!(code, 0);
    assert_eq!(
        handlers.calls(),
        vec![Call::Custom {
            name: "lint".into(),
            package: Some("my-lib".into()),
        }]
    );
}

#[tokio::test]
async fn test_custom_command_colliding_with_builtin_is_rejected() {
    let dir = project("[commands]\nbuild = \"make\"\n");
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let (code, errors) = invoke(dir.path(), &["build"], handlers.clone()).await;

    assert_eq!(code, 1);
    assert_eq!(errors, 1);
    assert!(handlers.calls().is_empty());
}

#[tokio::test]
async fn test_handler_error_exits_with_one_and_logs_once() {
    let dir = project("");
    let handlers = RecordingHandlers::new(Mode::Fail);

    let (code, errors) = invoke(dir.path(), &["changelog"], handlers.clone()).await;

    assert_eq!(code, 1);
    assert_eq!(errors, 1);
    assert_eq!(handlers.calls(), vec![Call::Changelog]);
}

#[tokio::test]
async fn test_handler_panic_is_trapped() {
    let dir = project("");
    let handlers = RecordingHandlers::new(Mode::Panic);

    let (code, errors) = invoke(dir.path(), &["dev", "pkgA"], handlers).await;

    assert_eq!(code, 1);
    assert_eq!(errors, 1);
}

#[tokio::test]
async fn test_help_and_version_exit_cleanly() {
    let dir = project("[commands]\nlint = \"eslint .\"\n");
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let cases: [&[&str]; 5] = [
        &["--help"],
        &["-h"],
        &["build", "--help"],
        &["--version"],
        &["-v"],
    ];
    for argv in cases {
        let (code, errors) = invoke(dir.path(), argv, handlers.clone()).await;
        assert_eq!(code, 0, "argv {argv:?}");
        assert_eq!(errors, 0);
    }
    assert!(handlers.calls().is_empty());
}

#[tokio::test]
async fn test_parse_errors_exit_with_one() {
    let dir = project("");
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let (code, _) = invoke(dir.path(), &["build", "--bogus"], handlers.clone()).await;
    assert_eq!(code, 1);

    let (code, _) = invoke(dir.path(), &["run"], handlers.clone()).await;
    assert_eq!(code, 1);

    assert!(handlers.calls().is_empty());
}

#[tokio::test]
async fn test_run_forwards_unknown_options() {
    let dir = project("");
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let (code, _) = invoke(
        dir.path(),
        &["run", "src/test.ts", "--workspaces", "extraFlag", "--inspect"],
        handlers.clone(),
    )
    .await;

    assert_eq!(code, 0);
    assert_eq!(
        handlers.calls(),
        vec![Call::Run(RunOptions {
            file: "src/test.ts".into(),
            args: vec!["extraFlag".into(), "--inspect".into()],
            workspaces: true,
            sequential: false,
        })]
    );
}

#[tokio::test]
async fn test_run_accepts_unknown_options_before_file() {
    let dir = project("");
    let handlers = RecordingHandlers::new(Mode::Succeed);

    let (code, errors) = invoke(
        dir.path(),
        &["run", "-w", "--inspect=true", "a.js", "b"],
        handlers.clone(),
    )
    .await;

    assert_eq!(code, 0);
    assert_eq!(errors, 0);
    assert_eq!(
        handlers.calls(),
        vec![Call::Run(RunOptions {
            file: "a.js".into(),
            args: vec!["--inspect=true".into(), "b".into()],
            workspaces: true,
            sequential: false,
        })]
    );
}

#[tokio::test]
async fn test_every_command_help_shows_usage_and_description() {
    let dir = project("[commands]\nlint = \"eslint .\"\n");
    let package = RootPackage::load(dir.path()).await.unwrap();
    let registry = CommandRegistry::from_package(&package).unwrap();

    let cases: [(&str, &str); 5] = [
        ("build", "Bundle input files"),
        ("dev", "Generate package stubs"),
        ("run", "<file>"),
        ("changelog", "Generate changelog"),
        ("lint", "Custom command (my-lib)"),
    ];
    for (command, expected) in cases {
        let err = registry.parse(["siroc", command, "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp, "{command}");
        let help = err.to_string();
        assert!(help.contains(command), "{command}: {help}");
        assert!(help.contains(expected), "{command}: {help}");
    }
}
