//! core::config::schema
//!
//! Configuration schema types.
//!
//! Located at (in order of precedence):
//! 1. `--config <path>` on the command line
//! 2. `$GHPUBLISH_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/ghpublish/config.toml`
//! 4. `~/.ghpublish/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., `api_base` must be an http(s) URL).

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound for `timeout_secs`.
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Upper bound for `blob_concurrency`.
pub const MAX_BLOB_CONCURRENCY: usize = 32;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// api_base = "https://api.github.com"
/// token_env = "GITHUB_TOKEN"
/// timeout_secs = 30
/// default_branch = "main"
/// blob_concurrency = 4
///
/// [collect]
/// include_dirs = ["backend", "frontend"]
/// extra_excludes = ["*.log", "secrets"]
/// synthesize = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// REST API base URL
    pub api_base: Option<String>,

    /// Environment variable holding the token
    pub token_env: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Branch used when a command does not name one
    pub default_branch: Option<String>,

    /// Maximum blob uploads in flight during an atomic commit
    pub blob_concurrency: Option<usize>,

    /// File collection settings
    pub collect: Option<CollectSection>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(api_base) = &self.api_base {
            let url = Url::parse(api_base).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid api_base '{}': {}", api_base, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                return Err(ConfigError::InvalidValue(format!(
                    "api_base '{}' must be an http(s) URL",
                    api_base
                )));
            }
        }

        if let Some(var) = &self.token_env {
            if var.is_empty() || var.contains('=') || var.contains('\0') {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid token_env '{}'",
                    var
                )));
            }
        }

        if let Some(secs) = self.timeout_secs {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue(format!(
                    "timeout_secs must be between 1 and {}, got {}",
                    MAX_TIMEOUT_SECS, secs
                )));
            }
        }

        if let Some(branch) = &self.default_branch {
            if branch.trim().is_empty() || branch.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid default_branch '{}'",
                    branch
                )));
            }
        }

        if let Some(n) = self.blob_concurrency {
            if n == 0 || n > MAX_BLOB_CONCURRENCY {
                return Err(ConfigError::InvalidValue(format!(
                    "blob_concurrency must be between 1 and {}, got {}",
                    MAX_BLOB_CONCURRENCY, n
                )));
            }
        }

        if let Some(collect) = &self.collect {
            collect.validate()?;
        }

        Ok(())
    }
}

/// `[collect]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CollectSection {
    /// Sub-directories of the project root to walk
    pub include_dirs: Option<Vec<String>>,

    /// Additional names or `*.ext` patterns to skip
    pub extra_excludes: Option<Vec<String>>,

    /// Append a README.md and .gitignore
    pub synthesize: Option<bool>,
}

impl CollectSection {
    /// Validate the collect section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dir in self.include_dirs.iter().flatten() {
            let escapes = dir.starts_with('/') || dir.split('/').any(|part| part == "..");
            if dir.is_empty() || escapes {
                return Err(ConfigError::InvalidValue(format!(
                    "include_dirs entry '{}' must be a relative path inside the project",
                    dir
                )));
            }
        }
        for pattern in self.extra_excludes.iter().flatten() {
            if pattern.is_empty() || pattern == "*." {
                return Err(ConfigError::InvalidValue(
                    "extra_excludes entries cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
