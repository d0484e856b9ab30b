//! auth
//!
//! Credential resolution for the hosting API client.
//!
//! # Design
//!
//! The client never looks up a token on its own. A [`CredentialSource`]
//! produces a [`Credential`] at the edge of the program (the CLI, or a test)
//! and the credential is injected into
//! [`GitHubClient::connect`](crate::forge::github::GitHubClient::connect).
//!
//! - [`EnvCredentialSource`]: reads an environment variable (default
//!   `GITHUB_TOKEN`, configurable through `token_env`)
//! - [`StaticCredential`]: a fixed token
//!
//! # Example
//!
//! ```
//! use ghpublish::auth::{CredentialSource, StaticCredential};
//!
//! let credential = StaticCredential::new("ghp_example").credential().unwrap();
//! assert_eq!(format!("{:?}", credential), "Credential(<redacted>)");
//! ```

mod credential;

pub use credential::{
    Credential, CredentialError, CredentialSource, EnvCredentialSource, StaticCredential,
    DEFAULT_TOKEN_ENV,
};
