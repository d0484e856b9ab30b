//! publish
//!
//! Publishing files to a hosted repository.
//!
//! # Workflows
//!
//! - [`commit_changes`]: the atomic workflow. All files land in one commit
//!   built from Git Data primitives (branch tip, blobs, tree, commit, ref
//!   update). Readers see nothing until the final ref update succeeds.
//! - [`push_files`]: the legacy per-file path through the contents endpoint.
//!   Produces one commit per file and reports partial success explicitly.
//! - [`upsert_file`]: create or update a single file.
//!
//! Both workflows are written against [`HostingApi`](crate::forge::HostingApi)
//! and never talk to HTTP directly.

mod atomic;
mod legacy;

pub use atomic::{commit_changes, CommitOptions, CommitOutcome, CommitRequest};
pub use legacy::{push_files, upsert_file, BatchPushOptions, BatchPushReport, PushFailure};

use base64::Engine as _;

use crate::forge::{BlobEncoding, ForgeError};

/// A path and content to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Repository-relative path with `/` separators
    pub path: String,
    /// Content, encoded as `encoding` says
    pub content: String,
    pub encoding: BlobEncoding,
}

impl FileChange {
    /// A UTF-8 text file.
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            encoding: BlobEncoding::Utf8,
        }
    }

    /// A binary file, carried as Base64.
    pub fn binary(path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            path: path.into(),
            content: base64::engine::general_purpose::STANDARD.encode(bytes),
            encoding: BlobEncoding::Base64,
        }
    }

    /// Check the path can name a blob in a tree.
    ///
    /// # Errors
    ///
    /// `ForgeError::InvalidInput` for empty, absolute, or non-normalized
    /// paths (`a//b`, `./a`, `../a`, trailing `/`).
    pub fn validate(&self) -> Result<(), ForgeError> {
        let path = self.path.as_str();
        let malformed = path.is_empty()
            || path.contains('\0')
            || path
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..");
        if malformed {
            return Err(ForgeError::InvalidInput(format!(
                "'{}' is not a valid repository path",
                path
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_defaults_to_utf8() {
        let file = FileChange::text("a.txt", "hello");
        assert_eq!(file.encoding, BlobEncoding::Utf8);
        assert_eq!(file.content, "hello");
    }

    #[test]
    fn binary_is_base64() {
        let file = FileChange::binary("logo.png", &[0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(file.encoding, BlobEncoding::Base64);
        assert_eq!(file.content, "iVBORw==");
    }

    #[test]
    fn validate_paths() {
        for ok in ["a.txt", "src/main.rs", ".gitignore", "dir/.hidden/x"] {
            assert!(FileChange::text(ok, "").validate().is_ok(), "{}", ok);
        }
        for bad in ["", "/abs", "trailing/", "a//b", "./a", "a/../b"] {
            assert!(
                matches!(
                    FileChange::text(bad, "").validate(),
                    Err(ForgeError::InvalidInput(_))
                ),
                "{}",
                bad
            );
        }
    }
}
