//! # contract: the capability set every repository backend implements
//!
//! This module defines a single trait ([`SourceProvider`]) and the plain data types that
//! cross it. The traversal and flattening engines depend only on this module, never on a
//! concrete backend.
//!
//! ## Interface & Extensibility
//! - Implement [`SourceProvider`] to add a new backend (another Git host, an archive, ...).
//! - `list_children` returns exactly one directory level; recursion is the engine's job.
//! - `fetch_file` never fails: a file that cannot be retrieved comes back as a [`FileBlob`]
//!   with `bytes: None`, so one unreadable file never aborts a traversal.
//! - `find_readme` never fails either; it falls back to [`README_NOT_FOUND`].
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so tests can script a tree without any backend.

use async_trait::async_trait;
use mockall::automock;

use crate::error::SourceError;

/// Conventional README names, probed in this order.
pub const README_CANDIDATES: [&str; 3] = ["README.md", "readme.md", "ReadMe.md"];

/// Text emitted in the README section when no candidate could be read.
pub const README_NOT_FOUND: &str = "README not found.";

/// Kind of a single listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File,
}

/// One record returned by a single-level listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Base name of the entry.
    pub name: String,
    /// Backend-relative, slash-separated path (no leading slash).
    pub path: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Raw bytes of one file; `None` when the backend could not hand them over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub path: String,
    pub bytes: Option<Vec<u8>>,
}

impl FileBlob {
    pub fn present(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes: Some(bytes),
        }
    }

    pub fn absent(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            bytes: None,
        }
    }
}

/// Reference to a resolved repository, valid for one `process_repo` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// Human-readable repository name (last URL segment or directory base name).
    pub name: String,
    /// Backend-specific locator: `owner/repo`, a GitLab project id, or an absolute root path.
    pub locator: String,
    /// Default branch reported by the backend, if it has such a notion.
    pub default_branch: Option<String>,
}

/// The final output of one flattening run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedArtifact {
    pub repository_name: String,
    pub content: String,
}

/// Which backend a provider talks to. Drives the fixed header texts and placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    GitHub,
    GitLab,
    Local,
}

impl BackendKind {
    pub fn is_remote(self) -> bool {
        !matches!(self, BackendKind::Local)
    }

    /// Instruction preamble that opens the artifact.
    pub fn preamble(self) -> &'static str {
        match self {
            BackendKind::GitHub => {
                "Please analyze using the following provided files and contents:"
            }
            BackendKind::GitLab => "Use the following files and contents for analysis:",
            BackendKind::Local => {
                "Use the files and contents provided below to complete this analysis:"
            }
        }
    }

    /// Label in front of the repository name on the structure header line.
    pub fn structure_header(self) -> &'static str {
        match self {
            BackendKind::GitHub => "repo structure",
            BackendKind::GitLab => "Repository structure",
            BackendKind::Local => "Repository Structure",
        }
    }

    /// Placeholder for a text file whose bytes could not be retrieved.
    pub fn missing_bytes_notice(self) -> &'static str {
        if self.is_remote() {
            "Content: Skipped due to missing encoding"
        } else {
            "Content: Skipped due to decoding error or file not found"
        }
    }

    /// Render a backend-relative path the way it appears in the artifact.
    pub fn display_path(self, path: &str) -> String {
        match self {
            BackendKind::Local => format!("./{path}"),
            _ => format!("/{path}"),
        }
    }
}

/// Capability set for one repository backend.
///
/// The trait is `Send` + `Sync` and intended for async/await usage. The engines await its
/// methods strictly one at a time.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Backend this provider talks to.
    fn kind(&self) -> BackendKind;

    /// Parse a URL (remote) or validate a path (local) and look the repository up.
    async fn resolve(&self, identifier: &str) -> Result<RepositoryHandle, SourceError>;

    /// Direct children of `path` (root when empty) as of `reference`. Never recurses.
    async fn list_children(
        &self,
        handle: &RepositoryHandle,
        path: &str,
        reference: &str,
    ) -> Result<Vec<TreeEntry>, SourceError>;

    /// Raw bytes of one file. Retrieval failure is reported as an absent blob.
    async fn fetch_file(&self, handle: &RepositoryHandle, path: &str, reference: &str)
        -> FileBlob;

    /// First README candidate that decodes as UTF-8, or [`README_NOT_FOUND`].
    async fn find_readme(&self, handle: &RepositoryHandle, reference: &str) -> String {
        for candidate in README_CANDIDATES {
            let blob = self.fetch_file(handle, candidate, reference).await;
            if let Some(bytes) = blob.bytes {
                if let Ok(text) = String::from_utf8(bytes) {
                    tracing::debug!(readme = candidate, "Found README");
                    return text;
                }
            }
        }
        tracing::debug!(repo = %handle.name, "No README candidate found");
        README_NOT_FOUND.to_string()
    }
}
