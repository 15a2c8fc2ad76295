//! 根包与根上下文
//!
//! 进程入口处显式加载一次根包，之后以参数形式传给每个命令处理器。

use crate::config::loader::{OptionsLoader, TomlOptionsLoader, OPTIONS_FILE};
use crate::config::types::{CustomCommand, PackageManifest, SirocOptions};
use crate::error::ManifestError;
use crate::reporter::Reporter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 清单文件名
pub const MANIFEST_FILE: &str = "package.json";

/// 根目录环境变量
pub const ROOT_DIR_ENV: &str = "SIROC_ROOT";

/// 包名缺失时示例文本使用的占位名
pub const DEFAULT_PACKAGE_NAME: &str = "@siroc/cli";

/// 解析根目录：优先使用 `SIROC_ROOT`，否则使用当前目录
pub fn resolve_root_dir() -> std::io::Result<PathBuf> {
    match std::env::var_os(ROOT_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => std::env::current_dir(),
    }
}

/// 已加载的根包
#[derive(Debug, Clone)]
pub struct RootPackage {
    /// 根目录
    pub root_dir: PathBuf,
    /// `package.json` 内容
    pub manifest: PackageManifest,
    /// `siroc.toml` 内容，文件不存在时为默认值
    pub options: SirocOptions,
    /// 验证后的自定义命令，保持声明顺序
    pub commands: Vec<CustomCommand>,
}

/// 路径存在且是普通文件
async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

impl RootPackage {
    /// 从目录加载根包
    ///
    /// `package.json` 必须存在且可解析；`siroc.toml` 可选。
    pub async fn load(root_dir: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let root_dir = root_dir.as_ref().to_path_buf();
        let manifest_path = root_dir.join(MANIFEST_FILE);

        if !is_file(&manifest_path).await {
            return Err(ManifestError::NotFound { path: root_dir });
        }

        let content = tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|source| ManifestError::Read {
                path: manifest_path.clone(),
                source,
            })?;
        let manifest: PackageManifest =
            serde_json::from_str(&content).map_err(|e| ManifestError::Parse {
                path: manifest_path.clone(),
                message: e.to_string(),
            })?;

        let options_path = root_dir.join(OPTIONS_FILE);
        let options = if is_file(&options_path).await {
            TomlOptionsLoader::default()
                .load_from_file(&options_path)
                .await?
        } else {
            SirocOptions::default()
        };
        let commands = options.custom_commands()?;

        debug!(
            "已加载根包 {} ({} 个自定义命令)",
            manifest.name.as_deref().unwrap_or("<unnamed>"),
            commands.len()
        );

        Ok(Self {
            root_dir,
            manifest,
            options,
            commands,
        })
    }

    /// 包名
    pub fn name(&self) -> Option<&str> {
        self.manifest.name.as_deref()
    }

    /// 用于帮助文本的包名，缺失时使用占位名
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(DEFAULT_PACKAGE_NAME)
    }
}

/// 根上下文，传给每个命令处理器
#[derive(Debug, Clone)]
pub struct RootContext {
    /// 根包
    pub package: RootPackage,
    /// 上报器
    pub reporter: Reporter,
}

impl RootContext {
    /// 创建根上下文
    pub fn new(package: RootPackage, reporter: Reporter) -> Self {
        Self { package, reporter }
    }

    /// 加载根包并创建根上下文
    pub async fn load(root_dir: impl AsRef<Path>) -> Result<Self, ManifestError> {
        Ok(Self::new(RootPackage::load(root_dir).await?, Reporter::new()))
    }

    /// 根目录
    pub fn root_dir(&self) -> &Path {
        &self.package.root_dir
    }
}
