//! forge
//!
//! Abstraction for the remote hosting API (GitHub).
//!
//! # Architecture
//!
//! The [`HostingApi`] trait defines every remote operation the crate uses.
//! The publishing workflows in [`crate::publish`] depend only on the trait,
//! so they run unchanged against [`github::GitHubClient`] or
//! [`mock::MockHost`].
//!
//! # Modules
//!
//! - `traits`: Core `HostingApi` trait, `ForgeError`, and request/response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `rate_limit`: Budget tracking from `X-RateLimit-*` response headers
//!
//! # Example
//!
//! ```ignore
//! use ghpublish::auth::EnvCredentialSource;
//! use ghpublish::forge::github::{ClientOptions, GitHubClient};
//! use ghpublish::forge::{HostingApi, ListReposOpts};
//!
//! let client = GitHubClient::from_source(ClientOptions::default(), &EnvCredentialSource::default()).await?;
//! for repo in client.list_repositories(ListReposOpts::default()).await? {
//!     println!("{}", repo.full_name);
//! }
//! ```

pub mod github;
pub mod mock;
mod rate_limit;
mod traits;

pub use rate_limit::RateLimitState;
pub use traits::*;
