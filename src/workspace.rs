//! 工作区解析
//!
//! 把 `package.json` 中的 yarn 工作区模式展开为包目录列表。
//! 模式按 glob 语法匹配（支持 `*`、`?`、`[...]` 与 `**`），以 `!` 开头的模式用于排除。

use crate::config::context::MANIFEST_FILE;
use crate::error::HandlerError;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// 展开时跳过的目录名
const IGNORED_DIR: &str = "node_modules";

/// 展开工作区模式，返回包含 `package.json` 的目录（已排序、去重）
pub async fn resolve_workspaces(
    root_dir: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, HandlerError> {
    let mut included = BTreeSet::new();
    let mut excluded = BTreeSet::new();

    for pattern in patterns {
        let (negated, pattern) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };

        let matches = expand_pattern(root_dir, pattern).await?;
        if negated {
            excluded.extend(matches);
        } else {
            included.extend(matches);
        }
    }

    Ok(included
        .into_iter()
        .filter(|dir| !excluded.contains(dir))
        .collect())
}

/// 展开单个模式
async fn expand_pattern(root_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, HandlerError> {
    let invalid = |reason: String| HandlerError::Workspace {
        pattern: pattern.to_string(),
        reason,
    };

    if Path::new(pattern)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(invalid(
            "pattern must be a relative path inside the root".to_string(),
        ));
    }

    let full_pattern = format!(
        "{}/{}",
        Pattern::escape(&root_dir.to_string_lossy()),
        pattern.trim_start_matches("./")
    );
    let root = root_dir.to_path_buf();

    let candidates = tokio::task::spawn_blocking(move || glob_candidates(&root, &full_pattern))
        .await
        .map_err(|e| invalid(e.to_string()))?
        .map_err(|e| invalid(e.to_string()))?;

    let mut packages = Vec::new();
    for dir in candidates {
        if is_package_dir(&dir).await {
            packages.push(dir);
        }
    }
    Ok(packages)
}

/// 运行 glob，跳过隐藏目录与 node_modules 下的匹配项
fn glob_candidates(root: &Path, full_pattern: &str) -> Result<Vec<PathBuf>, glob::PatternError> {
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut candidates = Vec::new();
    for entry in glob::glob_with(full_pattern, options)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                debug!("跳过无法读取的路径: {}", e);
                continue;
            }
        };
        let ignored = path
            .strip_prefix(root)
            .map(|rel| {
                rel.components().any(|c| {
                    let name = c.as_os_str().to_string_lossy();
                    name == IGNORED_DIR || name.starts_with('.')
                })
            })
            .unwrap_or(true);
        if !ignored {
            candidates.push(path);
        }
    }
    Ok(candidates)
}

/// 目录存在且包含 `package.json`
async fn is_package_dir(dir: &Path) -> bool {
    let is_dir = tokio::fs::metadata(dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    is_dir
        && tokio::fs::metadata(dir.join(MANIFEST_FILE))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
}
