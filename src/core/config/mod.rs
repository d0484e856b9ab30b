//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! The first existing file wins:
//! 1. An explicit path (`--config`), which must exist
//! 2. `$GHPUBLISH_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/ghpublish/config.toml`
//! 4. `~/.ghpublish/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use ghpublish::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("API: {}", config.api_base());
//! println!("Branch: {}", config.default_branch());
//! ```

pub mod schema;

pub use schema::{CollectSection, FileConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::auth::DEFAULT_TOKEN_ENV;
use crate::collect::CollectOptions;
use crate::forge::github::{web_base_for, ClientOptions, DEFAULT_API_BASE, DEFAULT_TIMEOUT};
use crate::publish::CommitOptions;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "GHPUBLISH_CONFIG";

/// Branch used when neither the command nor the config names one.
pub const DEFAULT_BRANCH: &str = "main";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Effective configuration.
///
/// Accessors apply defaults for anything the file leaves unset.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from the config file
    pub file: FileConfig,
    /// Path the file was loaded from, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is missing, or a config file exists
    /// but cannot be read, parsed, or validated. A missing default file is
    /// not an error (defaults are used).
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        Self::load_with(explicit, |name| std::env::var(name).ok(), dirs::home_dir())
    }

    /// [`load`](Self::load) with injected environment and home directory.
    fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Config, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(&env, home),
        };

        let file = match &path {
            Some(path) => Self::read_config(path)?,
            None => FileConfig::default(),
        };
        file.validate()?;

        Ok(Config { file, path })
    }

    /// First existing file among the default locations.
    fn discover(env: &impl Fn(&str) -> Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
        // 1. Check $GHPUBLISH_CONFIG
        if let Some(path) = env(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/ghpublish/config.toml
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("ghpublish/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.ghpublish/config.toml
        home.map(|home| home.join(".ghpublish/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// REST API base URL, without trailing slash.
    pub fn api_base(&self) -> &str {
        self.file
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    /// Web URL base matching the API base.
    pub fn web_base(&self) -> String {
        web_base_for(self.api_base())
    }

    /// Environment variable holding the token.
    ///
    /// Defaults to `GITHUB_TOKEN`.
    pub fn token_env(&self) -> &str {
        self.file.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }

    /// Per-request timeout.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(&self) -> Duration {
        self.file
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Branch used when a command does not name one.
    ///
    /// Defaults to `main`.
    pub fn default_branch(&self) -> &str {
        self.file.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    /// Client connection settings.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_base: self.api_base().to_string(),
            timeout: self.timeout(),
        }
    }

    /// Atomic commit settings.
    pub fn commit_options(&self) -> CommitOptions {
        let mut options = CommitOptions::default();
        if let Some(n) = self.file.blob_concurrency {
            options.blob_concurrency = n;
        }
        options
    }

    /// File collection settings.
    pub fn collect_options(&self) -> CollectOptions {
        let mut options = CollectOptions::default();
        if let Some(section) = &self.file.collect {
            if let Some(dirs) = &section.include_dirs {
                options.include_dirs = dirs.clone();
            }
            if let Some(excludes) = &section.extra_excludes {
                options.extra_excludes = excludes.clone();
            }
            if let Some(synthesize) = section.synthesize {
                options.synthesize = synthesize;
            }
        }
        options
    }

    /// Get the path the config file was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(vars: &[(&str, &Path)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string_lossy().into_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn load_empty_defaults() {
        let result = Config::load_with(None, env_of(&[]), None).unwrap();

        assert!(result.loaded_from().is_none());
        assert_eq!(result.api_base(), "https://api.github.com");
        assert_eq!(result.web_base(), "https://github.com");
        assert_eq!(result.token_env(), "GITHUB_TOKEN");
        assert_eq!(result.timeout(), Duration::from_secs(30));
        assert_eq!(result.default_branch(), "main");
        assert_eq!(result.commit_options().blob_concurrency, 4);
        assert_eq!(result.collect_options(), CollectOptions::default());
    }

    #[test]
    fn load_from_env_var() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("custom.toml");
        fs::write(
            &config_path,
            r#"
            default_branch = "trunk"
            timeout_secs = 5
            "#,
        )
        .unwrap();

        let config =
            Config::load_with(None, env_of(&[(CONFIG_ENV, config_path.as_path())]), None).unwrap();

        assert_eq!(config.loaded_from(), Some(config_path.as_path()));
        assert_eq!(config.default_branch(), "trunk");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn env_var_beats_xdg_and_home() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("env.toml");
        fs::write(&explicit, "default_branch = \"from-env\"").unwrap();
        let xdg = temp.path().join("xdg");
        fs::create_dir_all(xdg.join("ghpublish")).unwrap();
        fs::write(xdg.join("ghpublish/config.toml"), "default_branch = \"from-xdg\"").unwrap();

        let config = Config::load_with(
            None,
            env_of(&[(CONFIG_ENV, explicit.as_path()), ("XDG_CONFIG_HOME", xdg.as_path())]),
            None,
        )
        .unwrap();
        assert_eq!(config.default_branch(), "from-env");

        let config = Config::load_with(None, env_of(&[("XDG_CONFIG_HOME", xdg.as_path())]), None).unwrap();
        assert_eq!(config.default_branch(), "from-xdg");
    }

    #[test]
    fn home_fallback() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".ghpublish")).unwrap();
        fs::write(
            temp.path().join(".ghpublish/config.toml"),
            "token_env = \"GH_TOKEN\"",
        )
        .unwrap();

        let config =
            Config::load_with(None, env_of(&[]), Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.token_env(), "GH_TOKEN");
    }

    #[test]
    fn explicit_path_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");
        let err = Config::load_with(Some(&missing), env_of(&[]), None).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn collect_section_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            blob_concurrency = 8
            api_base = "https://ghe.example.com/api/v3/"

            [collect]
            include_dirs = ["app"]
            synthesize = false
            "#,
        )
        .unwrap();

        let config = Config::load_with(Some(&path), env_of(&[]), None).unwrap();
        let collect = config.collect_options();

        assert_eq!(collect.include_dirs, vec!["app".to_string()]);
        assert!(!collect.synthesize);
        assert!(collect.extra_excludes.is_empty());
        assert_eq!(config.commit_options().blob_concurrency, 8);
        assert_eq!(config.api_base(), "https://ghe.example.com/api/v3");
        assert_eq!(config.web_base(), "https://ghe.example.com");
        assert_eq!(config.client_options().api_base, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn invalid_value_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "blob_concurrency = 0").unwrap();

        let err = Config::load_with(Some(&path), env_of(&[]), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            default_branch = "main"
            unknown_field = true
            "#,
        )
        .unwrap();

        let err = Config::load_with(Some(&path), env_of(&[]), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
