//! forge::traits
//!
//! Hosting API trait definition and the request/response types shared by
//! every implementation.
//!
//! # Design
//!
//! The `HostingApi` trait is async because every operation involves network
//! I/O. All methods return `Result<_, ForgeError>`; the only places where a
//! "not found" answer is folded into a value are the explicit existence
//! checks ([`HostingApi::get_file_sha`] and
//! [`HostingApi::repository_exists`]).
//!
//! The trait exposes two families of operations:
//! - Repository and contents operations (list/get/create/delete repos,
//!   single-file pushes through the contents endpoint)
//! - Git Data primitives (branch tip, blob, tree, commit, ref update) that
//!   the atomic commit workflow in [`crate::publish`] is built on
//!
//! # Example
//!
//! ```ignore
//! use ghpublish::forge::{HostingApi, RepoRef};
//!
//! async fn show(host: &dyn HostingApi) -> Result<(), ForgeError> {
//!     let repo = RepoRef::parse("octocat/hello-world")?;
//!     match host.repository_exists(&repo).await? {
//!         Some(r) => println!("{} ({})", r.full_name, r.default_branch),
//!         None => println!("{} does not exist", repo),
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard ceiling the hosting API places on page sizes.
pub const MAX_PER_PAGE: u32 = 100;

/// Errors from hosting API operations.
///
/// One variant per failure kind; each carries only the fields relevant to
/// that kind.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// The credential is missing or was rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The referenced repository, branch, or file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API rejected a request with field-level validation errors.
    #[error("validation failed: {}", describe_validation(.message, .fields))]
    Validation {
        /// Top-level message from the API
        message: String,
        /// Per-field errors extracted from the API payload
        fields: Vec<FieldError>,
    },

    /// The branch moved between read and write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited{}", .reset.map(|r| format!(" until {}", r)).unwrap_or_default())]
    RateLimited {
        /// Unix timestamp at which the window resets, if reported
        reset: Option<u64>,
    },

    /// Any other non-success response.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Transport failure, including timeouts.
    #[error("network error: {0}")]
    Network(String),

    /// The request was rejected before anything was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ForgeError {
    /// HTTP status a transport layer should report for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ForgeError::Authentication(_) => 401,
            ForgeError::NotFound(_) => 404,
            ForgeError::Validation { .. } => 422,
            ForgeError::Conflict(_) => 409,
            ForgeError::RateLimited { .. } => 429,
            ForgeError::InvalidInput(_) => 400,
            ForgeError::Api { .. } | ForgeError::Network(_) => 500,
        }
    }

    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ForgeError::NotFound(_))
    }

    /// Check if the caller has to reconfigure the credential.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, ForgeError::Authentication(_))
    }

    /// Check if re-running the same operation later may succeed.
    ///
    /// A conflict is retryable only by re-running the whole workflow from
    /// the branch tip, never by repeating the failed call.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ForgeError::RateLimited { .. } | ForgeError::Network(_) | ForgeError::Conflict(_)
        )
    }
}

fn describe_validation(message: &str, fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return message.to_string();
    }
    let details = fields
        .iter()
        .map(FieldError::describe)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}: {}", message, details)
}

/// A single field-level error from a validation failure payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub resource: Option<String>,
    pub field: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl FieldError {
    /// Human-readable description of this field error.
    ///
    /// Uses the API's message when present, otherwise builds one from the
    /// resource, field, and code.
    pub fn describe(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        let target = match (&self.resource, &self.field) {
            (Some(resource), Some(field)) => format!("{}.{}", resource, field),
            (None, Some(field)) => field.clone(),
            (Some(resource), None) => resource.clone(),
            (None, None) => "request".to_string(),
        };
        format!("{} {}", target, self.code.as_deref().unwrap_or("invalid"))
    }
}

// --------------------------------------------------------------------------
// Identifiers
// --------------------------------------------------------------------------

/// A Git object identifier (SHA-1 or SHA-256 hex string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse an object id, normalizing to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::InvalidInput` unless the value is 40 or 64 hex
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ForgeError> {
        let value = value.into().to_ascii_lowercase();
        let valid_len = value.len() == 40 || value.len() == 64;
        if !valid_len || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ForgeError::InvalidInput(format!(
                "'{}' is not a valid object id",
                value
            )));
        }
        Ok(Self(value))
    }

    /// The full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display.
    pub fn short(&self) -> &str {
        &self.0[..7]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = ForgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ObjectId::new(value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

/// An `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name` or a GitHub remote URL.
    ///
    /// # Example
    ///
    /// ```
    /// use ghpublish::forge::RepoRef;
    ///
    /// let repo = RepoRef::parse("octocat/hello-world").unwrap();
    /// assert_eq!(repo.owner, "octocat");
    ///
    /// let repo = RepoRef::parse("git@github.com:octocat/hello-world.git").unwrap();
    /// assert_eq!(repo.name, "hello-world");
    /// ```
    pub fn parse(value: &str) -> Result<Self, ForgeError> {
        if let Some((owner, name)) = super::github::parse_github_url(value) {
            return Ok(Self::new(owner, name));
        }
        match value.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ForgeError::InvalidInput(format!(
                "expected 'owner/repo' or a GitHub URL, got '{}'",
                value
            ))),
        }
    }

    /// `owner/name` form.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// --------------------------------------------------------------------------
// Repository types
// --------------------------------------------------------------------------

/// The authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub id: u64,
}

/// A hosting-side repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub clone_url: String,
    pub ssh_url: String,
    pub default_branch: String,
    pub private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Current API usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Unix timestamp at which the window resets
    pub reset: u64,
    pub used: u64,
}

impl RateLimit {
    /// Reset time as a timestamp.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.reset).ok()?, 0)
    }
}

/// Visibility filter for listing repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    All,
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::All => "all",
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Visibility::All),
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

/// Sort key for listing repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepoSort {
    Created,
    #[default]
    Updated,
    Pushed,
    FullName,
}

impl RepoSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoSort::Created => "created",
            RepoSort::Updated => "updated",
            RepoSort::Pushed => "pushed",
            RepoSort::FullName => "full_name",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "created" => Some(RepoSort::Created),
            "updated" => Some(RepoSort::Updated),
            "pushed" => Some(RepoSort::Pushed),
            "full_name" => Some(RepoSort::FullName),
            _ => None,
        }
    }
}

/// Options for listing the authenticated user's repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListReposOpts {
    pub visibility: Visibility,
    pub sort: RepoSort,
    /// 1-based page number
    pub page: u32,
    /// Requested page size (capped at [`MAX_PER_PAGE`])
    pub per_page: u32,
}

impl Default for ListReposOpts {
    fn default() -> Self {
        Self {
            visibility: Visibility::All,
            sort: RepoSort::Updated,
            page: 1,
            per_page: 30,
        }
    }
}

impl ListReposOpts {
    /// Page size actually sent to the API.
    pub fn effective_per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Page number actually sent to the API.
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }
}

/// Request to create a repository for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRepoRequest {
    pub name: String,
    pub description: Option<String>,
    pub private: bool,
    /// Create an initial commit so the default branch exists
    pub auto_init: bool,
    /// Gitignore template (e.g. "Python", "Node")
    pub gitignore_template: Option<String>,
}

impl CreateRepoRequest {
    /// A public, auto-initialized repository with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            private: false,
            auto_init: true,
            gitignore_template: None,
        }
    }

    /// Description to send, falling back to a generated one.
    pub fn effective_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Generated project: {}", self.name))
    }
}

/// Request to create or update one file through the contents endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutFileRequest {
    pub repo: RepoRef,
    pub path: String,
    /// Plain text content; transport-encoded by the implementation
    pub content: String,
    pub message: String,
    pub branch: String,
    /// Hash of the file being replaced; `None` creates a new file
    pub existing_sha: Option<ObjectId>,
}

/// Commit produced by a single-file push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: ObjectId,
    /// API URL of the commit
    pub url: String,
    /// Web URL of the commit
    pub html_url: String,
}

// --------------------------------------------------------------------------
// Git Data types
// --------------------------------------------------------------------------

/// The commit a branch points at, and that commit's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    pub commit: ObjectId,
    pub tree: ObjectId,
}

/// How blob content is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlobEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "base64")]
    Base64,
}

impl BlobEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobEncoding::Utf8 => "utf-8",
            BlobEncoding::Base64 => "base64",
        }
    }
}

/// File mode of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
    Symlink,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Regular => "100644",
            FileMode::Executable => "100755",
            FileMode::Symlink => "120000",
        }
    }
}

/// A blob entry to place in a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub mode: FileMode,
    pub sha: ObjectId,
}

impl TreeEntry {
    /// A regular-file entry.
    pub fn blob(path: impl Into<String>, sha: ObjectId) -> Self {
        Self {
            path: path.into(),
            mode: FileMode::Regular,
            sha,
        }
    }
}

/// A commit to create. Always exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommit {
    pub message: String,
    pub tree: ObjectId,
    pub parent: ObjectId,
}

// --------------------------------------------------------------------------
// Trait
// --------------------------------------------------------------------------

/// Authenticated access to a remote hosting API.
///
/// Implementations must be `Send + Sync` so the workflow can keep several
/// requests in flight.
///
/// # Error Handling
///
/// - `Authentication`: reconfigure the credential
/// - `NotFound`: resource doesn't exist
/// - `RateLimited`: back off and retry
/// - `Conflict`: re-run the workflow against the new branch tip
/// - `Api` / `Network`: display and give up
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Name of the hosting provider (e.g. "github").
    fn name(&self) -> &'static str;

    /// Current usage counters.
    async fn get_rate_limit(&self) -> Result<RateLimit, ForgeError>;

    /// List the authenticated user's repositories, one page at a time.
    async fn list_repositories(&self, opts: ListReposOpts) -> Result<Vec<Repository>, ForgeError>;

    /// Get a repository.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the repository doesn't exist or is not visible
    async fn get_repository(&self, repo: &RepoRef) -> Result<Repository, ForgeError>;

    /// Existence check: `None` instead of `NotFound`.
    async fn repository_exists(&self, repo: &RepoRef) -> Result<Option<Repository>, ForgeError> {
        match self.get_repository(repo).await {
            Ok(found) => Ok(Some(found)),
            Err(ForgeError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a repository owned by the authenticated user.
    ///
    /// # Errors
    ///
    /// - `Validation` if the name is taken or otherwise rejected
    async fn create_repository(&self, request: CreateRepoRequest)
        -> Result<Repository, ForgeError>;

    /// Delete a repository. Irreversible.
    async fn delete_repository(&self, repo: &RepoRef) -> Result<(), ForgeError>;

    /// Hash of the file at `path` on `branch`, or `None` if absent.
    async fn get_file_sha(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<Option<ObjectId>, ForgeError>;

    /// Create or update a single file, producing one commit.
    async fn push_single_file(&self, request: PutFileRequest)
        -> Result<CommitSummary, ForgeError>;

    /// Resolve the commit and tree a branch currently points at.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the branch doesn't exist
    async fn get_branch_tip(&self, repo: &RepoRef, branch: &str) -> Result<BranchTip, ForgeError>;

    /// Store content as a blob.
    async fn create_blob(
        &self,
        repo: &RepoRef,
        content: &str,
        encoding: BlobEncoding,
    ) -> Result<ObjectId, ForgeError>;

    /// Create a tree from `base_tree` with `entries` added or replaced.
    async fn create_tree(
        &self,
        repo: &RepoRef,
        base_tree: &ObjectId,
        entries: &[TreeEntry],
    ) -> Result<ObjectId, ForgeError>;

    /// Create a single-parent commit.
    async fn create_commit(&self, repo: &RepoRef, commit: NewCommit)
        -> Result<ObjectId, ForgeError>;

    /// Point `branch` at `sha`.
    ///
    /// # Errors
    ///
    /// - `Conflict` if `force` is false and the update is not a fast-forward
    async fn update_ref(
        &self,
        repo: &RepoRef,
        branch: &str,
        sha: &ObjectId,
        force: bool,
    ) -> Result<(), ForgeError>;
}
