//! siroc 选项加载器实现
//!
//! 提供 `siroc.toml` 解析、环境变量替换和错误处理功能

use crate::config::types::SirocOptions;
use crate::error::ManifestError;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;

/// 选项文件名
pub const OPTIONS_FILE: &str = "siroc.toml";

/// 选项加载器trait，定义选项加载接口
#[async_trait]
pub trait OptionsLoader: Send + Sync {
    /// 从文件加载选项
    ///
    /// # 参数
    /// * `path` - 选项文件路径
    ///
    /// # 返回
    /// * `Result<SirocOptions, ManifestError>` - 加载的选项或错误
    async fn load_from_file(&self, path: &Path) -> Result<SirocOptions, ManifestError>;

    /// 从字符串加载选项
    fn load_from_string(&self, content: &str) -> Result<SirocOptions, ManifestError>;
}

/// TOML选项加载器实现
#[derive(Debug, Clone)]
pub struct TomlOptionsLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl Default for TomlOptionsLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TomlOptionsLoader {
    /// 创建新的TOML选项加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的 `${VAR_NAME}` 环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String, ManifestError> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            ManifestError::Parse {
                path: OPTIONS_FILE.into(),
                message: format!("invalid substitution pattern: {e}"),
            }
        })?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(ManifestError::EnvVar {
                        var: var_name.to_string(),
                    });
                }
            }
        }

        Ok(result)
    }

    /// 解析TOML内容
    fn parse_toml(&self, content: &str, path: &Path) -> Result<SirocOptions, ManifestError> {
        let processed_content = self.substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl OptionsLoader for TomlOptionsLoader {
    async fn load_from_file(&self, path: &Path) -> Result<SirocOptions, ManifestError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ManifestError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let options = self.parse_toml(&content, path)?;
        options.validate()?;

        log::debug!("成功加载选项文件: {}", path.display());
        Ok(options)
    }

    fn load_from_string(&self, content: &str) -> Result<SirocOptions, ManifestError> {
        let options = self.parse_toml(content, Path::new(OPTIONS_FILE))?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::HandlerSpec;
    use serial_test::serial;
    use std::env;

    const TEST_OPTIONS_TOML: &str = r#"
[commands]
lint = "eslint ."
typecheck = ["tsc", "--noEmit"]

[handlers]
build = ["rollup", "-c"]

[run]
runner = "jiti"
"#;

    #[test]
    fn test_toml_parsing() {
        let loader = TomlOptionsLoader::new(false);
        let options = loader.load_from_string(TEST_OPTIONS_TOML).unwrap();

        assert_eq!(options.commands.len(), 2);
        assert_eq!(
            options.handlers.build,
            Some(HandlerSpec::Argv(vec!["rollup".into(), "-c".into()]))
        );
        assert!(options.handlers.dev.is_none());
        assert_eq!(options.run.runner, "jiti");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let loader = TomlOptionsLoader::default();
        let options = loader.load_from_string("").unwrap();
        assert!(options.commands.is_empty());
        assert_eq!(options.run.runner, "node");
    }

    #[test]
    #[serial]
    fn test_env_var_substitution() {
        env::set_var("SIROC_TEST_LINT_TARGET", "src/");

        let loader = TomlOptionsLoader::new(true);
        let options = loader
            .load_from_string("[commands]\nlint = \"eslint ${SIROC_TEST_LINT_TARGET}\"\n")
            .unwrap();
        let commands = options.custom_commands().unwrap();
        assert_eq!(commands[0].handler, HandlerSpec::Shell("eslint src/".into()));

        env::remove_var("SIROC_TEST_LINT_TARGET");
    }

    #[test]
    #[serial]
    fn test_env_var_substitution_missing_var() {
        env::remove_var("SIROC_TEST_MISSING_VAR");

        let loader = TomlOptionsLoader::new(true);
        let result = loader.load_from_string("[run]\nrunner = \"${SIROC_TEST_MISSING_VAR}\"\n");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("SIROC_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = TomlOptionsLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let loader = TomlOptionsLoader::new(false);
        let err = loader.load_from_string("[commands\nlint =").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_load_from_missing_file() {
        let loader = TomlOptionsLoader::new(false);
        let dir = tempfile::tempdir().unwrap();
        let err = loader
            .load_from_file(&dir.path().join(OPTIONS_FILE))
            .await
            .unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
