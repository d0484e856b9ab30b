//! forge::github
//!
//! GitHub implementation of [`HostingApi`] using the REST v3 API.
//!
//! # Design
//!
//! [`GitHubClient`] is an authenticated session. It owns the credential (as a
//! pre-built header set), an HTTP client with a bounded per-request timeout,
//! and the identity of the authenticated user, which is verified once at
//! construction with `GET /user`.
//!
//! Repository operations use the repos and contents endpoints. The atomic
//! commit workflow uses the Git Data endpoints:
//! - `GET  /repos/{o}/{r}/git/ref/heads/{branch}` and `GET git/commits/{sha}`
//! - `POST /repos/{o}/{r}/git/blobs`
//! - `POST /repos/{o}/{r}/git/trees`
//! - `POST /repos/{o}/{r}/git/commits`
//! - `PATCH /repos/{o}/{r}/git/refs/heads/{branch}`
//!
//! # Errors
//!
//! Non-success responses are classified by `ErrorResponse`:
//! - 401 and 403 map to `Authentication`, except a rate-limited 403
//!   (`X-RateLimit-Remaining: 0`, a `Retry-After` header, or a "rate limit"
//!   message), which is `RateLimited` like 429
//! - 404 maps to `NotFound`
//! - 422 maps to `Validation` on repository creation and to `Conflict` on a
//!   rejected fast-forward
//! - Everything else is `Api { status, body }` with the raw body
//!
//! No call is retried. Timeouts surface as `Network`.
//!
//! # Example
//!
//! ```ignore
//! use ghpublish::auth::EnvCredentialSource;
//! use ghpublish::forge::github::{ClientOptions, GitHubClient};
//!
//! let client = GitHubClient::from_source(ClientOptions::default(), &EnvCredentialSource::default()).await?;
//! println!("authenticated as {}", client.user().login);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::rate_limit::{self, RateLimitState};
use super::traits::{
    BlobEncoding, BranchTip, CommitSummary, CreateRepoRequest, FieldError, ForgeError,
    HostingApi, ListReposOpts, NewCommit, ObjectId, PutFileRequest, RateLimit, RepoRef,
    Repository, TreeEntry, User,
};
use crate::auth::{Credential, CredentialSource};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "ghpublish";

/// REST API version pinned in every request.
const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// API base URL (configurable for GitHub Enterprise and tests)
    pub api_base: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Default options against a different API base.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Self::default()
        }
    }
}

/// Authenticated GitHub API session.
pub struct GitHubClient {
    /// HTTP client for making requests
    http: Client,
    /// Authorization, Accept, and API version headers
    headers: HeaderMap,
    /// API base URL, without trailing slash
    api_base: String,
    /// Budget observed from response headers
    rate_limit: RateLimitState,
    /// The authenticated principal
    user: User,
}

// Custom Debug to avoid exposing the Authorization header
impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .field("user", &self.user.login)
            .finish()
    }
}

impl GitHubClient {
    /// Create a session and verify the credential.
    ///
    /// # Errors
    ///
    /// - `Authentication` if the credential is empty or `GET /user` does not
    ///   succeed
    /// - `RateLimited` / `Network` if the identity check could not be made
    pub async fn connect(options: ClientOptions, credential: Credential) -> Result<Self, ForgeError> {
        if credential.is_empty() {
            return Err(ForgeError::Authentication("no credential configured".into()));
        }

        let headers = build_headers(&credential)?;
        let http = Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| ForgeError::Network(e.to_string()))?;
        let api_base = options.api_base.trim_end_matches('/').to_string();
        let rate_limit = RateLimitState::new();

        let url = endpoint(&api_base, &["user"])?;
        let response = dispatch(&rate_limit, http.get(url).headers(headers.clone())).await?;
        let user: User = match handle_response(response).await {
            Ok(user) => user,
            Err(e @ (ForgeError::Network(_) | ForgeError::RateLimited { .. })) => return Err(e),
            Err(ForgeError::Authentication(message)) => {
                return Err(ForgeError::Authentication(message))
            }
            Err(e) => {
                return Err(ForgeError::Authentication(format!(
                    "identity check failed: {}",
                    e
                )))
            }
        };

        info!(login = %user.login, api_base = %api_base, "GitHub client initialized");

        Ok(Self {
            http,
            headers,
            api_base,
            rate_limit,
            user,
        })
    }

    /// Resolve a credential from `source`, then [`connect`](Self::connect).
    pub async fn from_source(
        options: ClientOptions,
        source: &dyn CredentialSource,
    ) -> Result<Self, ForgeError> {
        let credential = source
            .credential()
            .map_err(|e| ForgeError::Authentication(e.to_string()))?;
        Self::connect(options, credential).await
    }

    /// The authenticated user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// API base URL in use.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Rate-limit budget observed from the latest responses.
    pub fn rate_limit_state(&self) -> &RateLimitState {
        &self.rate_limit
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).headers(self.headers.clone())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        dispatch(&self.rate_limit, request).await
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, repo: &RepoRef, path: &[&str]) -> Result<Url, ForgeError> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str()];
        segments.extend_from_slice(path);
        endpoint(&self.api_base, &segments)
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_rate_limit(&self) -> Result<RateLimit, ForgeError> {
        let url = endpoint(&self.api_base, &["rate_limit"])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let body: RateLimitResponse = handle_response(response).await?;
        Ok(body.rate)
    }

    async fn list_repositories(&self, opts: ListReposOpts) -> Result<Vec<Repository>, ForgeError> {
        let url = endpoint(&self.api_base, &["user", "repos"])?;
        let query = [
            ("visibility", opts.visibility.as_str().to_string()),
            ("sort", opts.sort.as_str().to_string()),
            ("per_page", opts.effective_per_page().to_string()),
            ("page", opts.effective_page().to_string()),
        ];

        let response = self.send(self.request(Method::GET, url).query(&query)).await?;
        handle_response(response).await
    }

    async fn get_repository(&self, repo: &RepoRef) -> Result<Repository, ForgeError> {
        let url = self.repo_url(repo, &[])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        handle_response(response).await.map_err(|e| match e {
            ForgeError::NotFound(_) => ForgeError::NotFound(format!("repository {}", repo)),
            other => other,
        })
    }

    async fn create_repository(
        &self,
        request: CreateRepoRequest,
    ) -> Result<Repository, ForgeError> {
        let url = endpoint(&self.api_base, &["user", "repos"])?;
        let description = request.effective_description();
        let body = CreateRepoBody {
            name: &request.name,
            description: &description,
            private: request.private,
            auto_init: request.auto_init,
            gitignore_template: request.gitignore_template.as_deref(),
            has_issues: true,
            has_projects: false,
            has_wiki: false,
        };

        let response = self.send(self.request(Method::POST, url).json(&body)).await?;
        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ErrorResponse::read(response).await.into_validation_error());
        }

        let created: Repository = handle_response(response).await?;
        info!(repo = %created.full_name, url = %created.html_url, "created repository");
        Ok(created)
    }

    async fn delete_repository(&self, repo: &RepoRef) -> Result<(), ForgeError> {
        let url = self.repo_url(repo, &[])?;
        let response = self.send(self.request(Method::DELETE, url)).await?;

        match response.status() {
            StatusCode::NO_CONTENT => {
                info!(repo = %repo, "deleted repository");
                Ok(())
            }
            status if status.is_success() => Err(ForgeError::Api {
                status: status.as_u16(),
                body: "delete was not confirmed".into(),
            }),
            _ => Err(ErrorResponse::read(response).await.into_error()),
        }
    }

    async fn get_file_sha(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<Option<ObjectId>, ForgeError> {
        let url = self.repo_url(repo, &["contents", path])?;
        let response = self
            .send(self.request(Method::GET, url).query(&[("ref", branch)]))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(repo = %repo, path, branch, "file absent");
            return Ok(None);
        }

        match handle_response::<ContentsResponse>(response).await? {
            ContentsResponse::File { sha } => Ok(Some(sha)),
            ContentsResponse::Directory(_) => Err(ForgeError::InvalidInput(format!(
                "'{}' is a directory",
                path
            ))),
        }
    }

    async fn push_single_file(
        &self,
        request: PutFileRequest,
    ) -> Result<CommitSummary, ForgeError> {
        let url = self.repo_url(&request.repo, &["contents", &request.path])?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(request.content.as_bytes());
        let body = PutContentsBody {
            message: &request.message,
            content: &encoded,
            branch: &request.branch,
            sha: request.existing_sha.as_ref().map(ObjectId::as_str),
        };

        let response = self.send(self.request(Method::PUT, url).json(&body)).await?;
        let status = response.status();
        if !status.is_success() {
            let err = ErrorResponse::read(response).await;
            return Err(match err.status {
                StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => ForgeError::Api {
                    status: err.status.as_u16(),
                    body: err.body,
                },
                _ => err.into_error(),
            });
        }

        let body: PutContentsResponse = handle_response(response).await?;
        debug!(repo = %request.repo, path = %request.path, commit = %body.commit.sha.short(), "pushed file");
        Ok(body.commit)
    }

    async fn get_branch_tip(&self, repo: &RepoRef, branch: &str) -> Result<BranchTip, ForgeError> {
        let url = self.repo_url(repo, &["git", "ref", "heads", branch])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let git_ref: GitRefResponse = handle_response(response).await.map_err(|e| match e {
            ForgeError::NotFound(_) => {
                ForgeError::NotFound(format!("branch '{}' in {}", branch, repo))
            }
            other => other,
        })?;

        let commit = git_ref.object.sha;
        let url = self.repo_url(repo, &["git", "commits", commit.as_str()])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let details: GitCommitResponse = handle_response(response).await?;

        Ok(BranchTip {
            commit,
            tree: details.tree.sha,
        })
    }

    async fn create_blob(
        &self,
        repo: &RepoRef,
        content: &str,
        encoding: BlobEncoding,
    ) -> Result<ObjectId, ForgeError> {
        let url = self.repo_url(repo, &["git", "blobs"])?;
        let body = BlobBody { content, encoding };
        let response = self.send(self.request(Method::POST, url).json(&body)).await?;
        let created: ShaResponse = handle_response(response).await?;
        Ok(created.sha)
    }

    async fn create_tree(
        &self,
        repo: &RepoRef,
        base_tree: &ObjectId,
        entries: &[TreeEntry],
    ) -> Result<ObjectId, ForgeError> {
        let url = self.repo_url(repo, &["git", "trees"])?;
        let body = TreeBody {
            base_tree: base_tree.as_str(),
            tree: entries
                .iter()
                .map(|entry| TreeItemBody {
                    path: &entry.path,
                    mode: entry.mode.as_str(),
                    kind: "blob",
                    sha: entry.sha.as_str(),
                })
                .collect(),
        };
        let response = self.send(self.request(Method::POST, url).json(&body)).await?;
        let created: ShaResponse = handle_response(response).await?;
        Ok(created.sha)
    }

    async fn create_commit(
        &self,
        repo: &RepoRef,
        commit: NewCommit,
    ) -> Result<ObjectId, ForgeError> {
        let url = self.repo_url(repo, &["git", "commits"])?;
        let body = CommitBody {
            message: &commit.message,
            tree: commit.tree.as_str(),
            parents: [commit.parent.as_str()],
        };
        let response = self.send(self.request(Method::POST, url).json(&body)).await?;
        let created: ShaResponse = handle_response(response).await?;
        Ok(created.sha)
    }

    async fn update_ref(
        &self,
        repo: &RepoRef,
        branch: &str,
        sha: &ObjectId,
        force: bool,
    ) -> Result<(), ForgeError> {
        let url = self.repo_url(repo, &["git", "refs", "heads", branch])?;
        let body = UpdateRefBody {
            sha: sha.as_str(),
            force,
        };
        let response = self.send(self.request(Method::PATCH, url).json(&body)).await?;
        if response.status().is_success() {
            return Ok(());
        }

        let err = ErrorResponse::read(response).await;
        let message = err.message();
        Err(match err.status {
            StatusCode::CONFLICT => ForgeError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY
                if message.to_lowercase().contains("fast forward") =>
            {
                ForgeError::Conflict(format!("branch '{}' moved: {}", branch, message))
            }
            StatusCode::UNPROCESSABLE_ENTITY if message.contains("Reference does not exist") => {
                ForgeError::NotFound(format!("branch '{}' in {}", branch, repo))
            }
            _ => err.into_error(),
        })
    }
}

// --------------------------------------------------------------------------
// Transport helpers
// --------------------------------------------------------------------------

/// Build the fixed header set for a credential.
fn build_headers(credential: &Credential) -> Result<HeaderMap, ForgeError> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose())).map_err(|_| {
        ForgeError::Authentication("credential contains characters not valid in a header".into())
    })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

/// Join path segments onto the API base, percent-encoding each one.
///
/// Segments containing `/` (file paths, branch names like `feature/x`) are
/// split so the separators stay literal.
fn endpoint(api_base: &str, segments: &[&str]) -> Result<Url, ForgeError> {
    let mut url = Url::parse(api_base).map_err(|e| {
        ForgeError::InvalidInput(format!("invalid API base '{}': {}", api_base, e))
    })?;
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            ForgeError::InvalidInput(format!("API base '{}' cannot be a base URL", api_base))
        })?;
        path.pop_if_empty().extend(
            segments
                .iter()
                .flat_map(|s| s.split('/'))
                .filter(|s| !s.is_empty()),
        );
    }
    Ok(url)
}

/// Send a request, recording rate-limit headers.
async fn dispatch(
    rate_limit: &RateLimitState,
    request: RequestBuilder,
) -> Result<Response, ForgeError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ForgeError::Network(format!("request timed out: {}", e))
        } else {
            ForgeError::Network(e.to_string())
        }
    })?;
    rate_limit.update_from_headers(response.headers());
    debug!(status = %response.status(), url = %response.url(), "GitHub API response");
    Ok(response)
}

/// Handle API response, mapping errors appropriately.
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ForgeError> {
    let status = response.status();
    if status.is_success() {
        response.json().await.map_err(|e| ForgeError::Api {
            status: status.as_u16(),
            body: format!("failed to parse response: {}", e),
        })
    } else {
        Err(ErrorResponse::read(response).await.into_error())
    }
}

/// A non-success response, read fully so it can be classified.
#[derive(Debug)]
struct ErrorResponse {
    status: StatusCode,
    body: String,
    rate_limit_remaining: Option<u64>,
    rate_limit_reset: Option<u64>,
    retry_after: Option<u64>,
}

impl ErrorResponse {
    async fn read(response: Response) -> Self {
        let status = response.status();
        let (rate_limit_remaining, rate_limit_reset) = rate_limit::parse_headers(response.headers());
        let retry_after = rate_limit::parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();
        Self {
            status,
            body,
            rate_limit_remaining,
            rate_limit_reset,
            retry_after,
        }
    }

    /// A 403 caused by the primary or secondary rate limit.
    ///
    /// Secondary limits leave `X-RateLimit-Remaining` above zero and send
    /// `Retry-After` instead.
    fn is_rate_limited(&self) -> bool {
        self.rate_limit_remaining == Some(0)
            || self.retry_after.is_some()
            || self.message().to_lowercase().contains("rate limit")
    }

    /// When the caller may retry: `Retry-After` if sent, else the window reset.
    fn reset(&self) -> Option<u64> {
        match self.retry_after {
            Some(secs) => {
                let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
                Some(now.saturating_add(secs))
            }
            None => self.rate_limit_reset,
        }
    }

    /// The API's `message` field, or the status reason.
    fn message(&self) -> String {
        serde_json::from_str::<GitHubErrorResponse>(&self.body)
            .map(|e| e.message)
            .unwrap_or_else(|_| {
                self.status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            })
    }

    fn into_error(self) -> ForgeError {
        match self.status {
            StatusCode::UNAUTHORIZED => {
                ForgeError::Authentication(format!("invalid or expired credential: {}", self.message()))
            }
            StatusCode::FORBIDDEN if self.is_rate_limited() => ForgeError::RateLimited {
                reset: self.reset(),
            },
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited {
                reset: self.reset(),
            },
            StatusCode::FORBIDDEN => {
                ForgeError::Authentication(format!("permission denied: {}", self.message()))
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(self.message()),
            status => ForgeError::Api {
                status: status.as_u16(),
                body: self.body,
            },
        }
    }

    /// Extract the per-field error list of a 422 payload.
    fn into_validation_error(self) -> ForgeError {
        match serde_json::from_str::<GitHubValidationResponse>(&self.body) {
            Ok(payload) => ForgeError::Validation {
                message: payload.message,
                fields: payload.errors.into_iter().map(Into::into).collect(),
            },
            Err(_) => ForgeError::Validation {
                message: self.message(),
                fields: Vec::new(),
            },
        }
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

#[derive(Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    gitignore_template: Option<&'a str>,
    has_issues: bool,
    has_projects: bool,
    has_wiki: bool,
}

#[derive(Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct BlobBody<'a> {
    content: &'a str,
    encoding: BlobEncoding,
}

#[derive(Serialize)]
struct TreeBody<'a> {
    base_tree: &'a str,
    tree: Vec<TreeItemBody<'a>>,
}

#[derive(Serialize)]
struct TreeItemBody<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    sha: &'a str,
}

#[derive(Serialize)]
struct CommitBody<'a> {
    message: &'a str,
    tree: &'a str,
    parents: [&'a str; 1],
}

#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// GitHub 422 response format.
#[derive(Deserialize)]
struct GitHubValidationResponse {
    message: String,
    #[serde(default)]
    errors: Vec<FieldErrorRepr>,
}

/// Entries of `errors` are usually objects but can be bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldErrorRepr {
    Object(FieldError),
    Text(String),
}

impl From<FieldErrorRepr> for FieldError {
    fn from(repr: FieldErrorRepr) -> Self {
        match repr {
            FieldErrorRepr::Object(field) => field,
            FieldErrorRepr::Text(message) => FieldError {
                message: Some(message),
                ..FieldError::default()
            },
        }
    }
}

#[derive(Deserialize)]
struct RateLimitResponse {
    rate: RateLimit,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    File { sha: ObjectId },
    Directory(Vec<serde_json::Value>),
}

#[derive(Deserialize)]
struct PutContentsResponse {
    commit: CommitSummary,
}

#[derive(Deserialize)]
struct ShaResponse {
    sha: ObjectId,
}

#[derive(Deserialize)]
struct GitRefResponse {
    object: ShaResponse,
}

#[derive(Deserialize)]
struct GitCommitResponse {
    tree: ShaResponse,
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats:
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use ghpublish::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:octocat/hello-world.git").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    // SSH format: git@github.com:owner/repo.git
    if let Some(rest) = url.strip_prefix("git@github.com:") {
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        let parts: Vec<&str> = rest.splitn(2, '/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Some((parts[0].to_string(), parts[1].to_string()));
        }
    }

    // HTTPS format: https://github.com/owner/repo.git
    if let Some(rest) = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))
    {
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        let rest = rest.trim_end_matches('/');
        let parts: Vec<&str> = rest.splitn(2, '/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Some((parts[0].to_string(), parts[1].to_string()));
        }
    }

    None
}

/// Web URL base matching an API base (`https://api.github.com` →
/// `https://github.com`, `https://ghe.example.com/api/v3` →
/// `https://ghe.example.com`).
pub fn web_base_for(api_base: &str) -> String {
    let api_base = api_base.trim_end_matches('/');
    if api_base == DEFAULT_API_BASE {
        return "https://github.com".to_string();
    }
    api_base
        .strip_suffix("/api/v3")
        .unwrap_or(api_base)
        .to_string()
}
