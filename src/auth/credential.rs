//! auth::credential
//!
//! Bearer credentials and where they come from.
//!
//! # Security
//!
//! A [`Credential`] never prints its value: `Debug` is redacted and there is
//! no `Display`. Error messages name the source (e.g. the environment
//! variable), never the token.

use std::fmt;

use thiserror::Error;

/// Default environment variable holding the GitHub token.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Errors resolving a credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// The source had no value.
    #[error("no credential found in {0}")]
    Missing(String),

    /// The source had a value that cannot be a bearer token.
    #[error("credential from {0} is malformed")]
    Malformed(String),
}

/// An opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, trimming surrounding whitespace.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// The raw token. Do not log or print it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Something that can produce a credential.
pub trait CredentialSource: Send + Sync {
    /// Human-readable name of the source, used in errors.
    fn describe(&self) -> String;

    /// Resolve the credential.
    fn credential(&self) -> Result<Credential, CredentialError>;
}

/// Reads the token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    var: String,
}

impl EnvCredentialSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

impl CredentialSource for EnvCredentialSource {
    fn describe(&self) -> String {
        format!("environment variable {}", self.var)
    }

    fn credential(&self) -> Result<Credential, CredentialError> {
        let value = std::env::var(&self.var).map_err(|_| CredentialError::Missing(self.describe()))?;
        validate(Credential::new(value), self)
    }
}

/// A fixed token, e.g. passed on the command line or in tests.
#[derive(Debug, Clone)]
pub struct StaticCredential(Credential);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Credential::new(token))
    }
}

impl CredentialSource for StaticCredential {
    fn describe(&self) -> String {
        "explicit token".to_string()
    }

    fn credential(&self) -> Result<Credential, CredentialError> {
        validate(self.0.clone(), self)
    }
}

fn validate(credential: Credential, source: &dyn CredentialSource) -> Result<Credential, CredentialError> {
    if credential.is_empty() {
        return Err(CredentialError::Missing(source.describe()));
    }
    if credential.expose().chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CredentialError::Malformed(source.describe()));
    }
    Ok(credential)
}
