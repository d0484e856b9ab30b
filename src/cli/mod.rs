//! cli
//!
//! Command-line interface layer for ghpub.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and build the shared [`Context`]
//! - Delegate to command handlers
//! - Map failures to exit codes
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | any other failure |
//! | 2 | authentication |
//! | 3 | not found |
//! | 4 | validation |
//! | 5 | conflict |
//! | 6 | rate limited |

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::PathBuf;

use anyhow::Result;

use crate::core::config::Config;
use crate::forge::ForgeError;
use crate::ui::output::{self, Printer, Verbosity};

/// State shared by every command handler.
#[derive(Debug)]
pub struct Context {
    /// Explicit config path from `--config`
    pub config_path: Option<PathBuf>,
    pub out: Printer,
}

impl Context {
    /// Load configuration for this invocation.
    pub fn load_config(&self) -> Result<Config> {
        let config = Config::load(self.config_path.as_deref())?;
        if let Some(path) = config.loaded_from() {
            self.out.debug(format!("config: {}", path.display()));
        }
        Ok(config)
    }
}

/// Run the CLI application and return the process exit code.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> i32 {
    let ctx = Context {
        config_path: cli.config.clone(),
        out: Printer::new(Verbosity::from_flags(cli.quiet, cli.debug), cli.json),
    };

    match commands::dispatch(cli.command, &ctx) {
        Ok(()) => 0,
        Err(e) => {
            output::error(format!("{:#}", e));
            exit_code(&e)
        }
    }
}

/// Exit code for a failed command.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ForgeError>() {
        Some(ForgeError::Authentication(_)) => 2,
        Some(ForgeError::NotFound(_)) => 3,
        Some(ForgeError::Validation { .. }) | Some(ForgeError::InvalidInput(_)) => 4,
        Some(ForgeError::Conflict(_)) => 5,
        Some(ForgeError::RateLimited { .. }) => 6,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn forge_errors_map_to_codes() {
        let cases = [
            (ForgeError::Authentication("bad".into()), 2),
            (ForgeError::NotFound("repo".into()), 3),
            (
                ForgeError::Validation {
                    message: "invalid".into(),
                    fields: vec![],
                },
                4,
            ),
            (ForgeError::InvalidInput("empty".into()), 4),
            (ForgeError::Conflict("moved".into()), 5),
            (ForgeError::RateLimited { reset: None }, 6),
            (ForgeError::Network("timeout".into()), 1),
        ];
        for (error, code) in cases {
            assert_eq!(exit_code(&anyhow::Error::new(error)), code);
        }
    }

    #[test]
    fn context_does_not_hide_kind() {
        let result: Result<(), ForgeError> = Err(ForgeError::Conflict("moved".into()));
        let error = result.context("failed to publish").unwrap_err();
        assert_eq!(exit_code(&error), 5);
    }

    #[test]
    fn other_errors_are_generic() {
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }
}
