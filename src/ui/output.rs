//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout, diagnostics to stderr. A [`Printer`] carries the
//! `--quiet`, `--debug`, and `--json` flags so handlers do not branch on
//! them. In JSON mode a command prints exactly one JSON document and
//! human-oriented lines are suppressed; warnings and errors still reach
//! stderr.

use std::fmt::Display;

use serde::Serialize;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }
}

/// Flag-aware writer for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Printer {
    pub verbosity: Verbosity,
    pub json: bool,
}

impl Printer {
    pub fn new(verbosity: Verbosity, json: bool) -> Self {
        Self { verbosity, json }
    }

    fn human(&self) -> bool {
        !self.json && self.verbosity != Verbosity::Quiet
    }

    /// A line of human-readable output.
    pub fn line(&self, message: impl Display) {
        if self.human() {
            println!("{}", message);
        }
    }

    /// Several lines, each prefixed.
    pub fn list<T: Display>(&self, items: &[T], prefix: &str) {
        if self.human() && !items.is_empty() {
            println!("{}", format_list(items, prefix));
        }
    }

    /// Extra detail shown with `--debug`.
    pub fn debug(&self, message: impl Display) {
        if self.verbosity == Verbosity::Debug {
            eprintln!("[debug] {}", message);
        }
    }

    /// A warning; suppressed by `--quiet`.
    pub fn warn(&self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            eprintln!("warning: {}", message);
        }
    }

    /// A command's result: `value` as JSON in JSON mode, otherwise the
    /// lines produced by `human`.
    pub fn result<T, F>(&self, value: &T, human: F) -> serde_json::Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> Vec<String>,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else if self.verbosity != Verbosity::Quiet {
            for line in human(value) {
                println!("{}", line);
            }
        }
        Ok(())
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Join items one per line, each prefixed.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a Unix timestamp for display.
pub fn format_timestamp(epoch_secs: u64) -> String {
    i64::try_from(epoch_secs)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}
