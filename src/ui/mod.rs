//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing output goes through this module so verbosity and JSON
//! mode are handled in one place. Diagnostic events go through `tracing`
//! instead.

pub mod output;
