//! 配置管理模块
//!
//! 负责加载根包清单（`package.json`）与 siroc 选项（`siroc.toml`），
//! 并构造传递给每个命令处理器的根上下文。

pub mod context;
pub mod loader;
pub mod types;

// 重新导出主要类型
pub use context::{resolve_root_dir, RootContext, RootPackage, DEFAULT_PACKAGE_NAME};
pub use loader::{OptionsLoader, TomlOptionsLoader};
pub use types::{
    CustomCommand, HandlerSpec, HandlersConfig, PackageManifest, RunConfig, SirocOptions,
    Workspaces,
};
