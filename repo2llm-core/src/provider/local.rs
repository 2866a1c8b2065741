//! Local-directory provider.
//!
//! Housekeeping names (VCS metadata, caches, virtualenvs) are dropped from every listing,
//! whether they are directories, files or links. Entries whose names are not valid UTF-8
//! cannot be addressed by a backend-relative path and are skipped with a warning. Symlinks are not followed: a link is listed as a file, and reading a link to a
//! directory degrades like any other unreadable file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::contract::{BackendKind, EntryKind, FileBlob, RepositoryHandle, SourceProvider, TreeEntry};
use crate::error::SourceError;

/// Entry names never listed.
pub const IGNORED_DIRS: &[&str] = &[".git", "__pycache__", ".svn", ".hg", ".DS_Store", ".venv"];

#[derive(Debug, Clone)]
pub struct LocalProvider {
    ignored_dirs: Vec<String>,
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self {
            ignored_dirs: IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl LocalProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore these directory names in addition to [`IGNORED_DIRS`].
    pub fn with_extra_ignored_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }

    fn absolute(handle: &RepositoryHandle, path: &str) -> PathBuf {
        let root = Path::new(&handle.locator);
        if path.is_empty() {
            root.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

fn map_io(error: std::io::Error, path: &Path) -> SourceError {
    if error.kind() == std::io::ErrorKind::NotFound {
        SourceError::NotFound(path.display().to_string())
    } else {
        SourceError::Io(error)
    }
}

#[async_trait]
impl SourceProvider for LocalProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn resolve(&self, identifier: &str) -> Result<RepositoryHandle, SourceError> {
        if identifier.trim().is_empty() {
            return Err(SourceError::InvalidIdentifier("empty repository path".into()));
        }
        let path = Path::new(identifier);
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| map_io(e, path))?;
        if !metadata.is_dir() {
            return Err(SourceError::NotFound(format!(
                "{identifier} is not a directory"
            )));
        }
        let root = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| map_io(e, path))?;

        let trimmed = identifier.trim_end_matches('/');
        let name = Path::new(trimmed)
            .file_name()
            .or_else(|| root.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        info!(repo = %name, root = %root.display(), "Resolved local repository");
        Ok(RepositoryHandle {
            name,
            locator: root.to_string_lossy().into_owned(),
            default_branch: None,
        })
    }

    async fn list_children(
        &self,
        handle: &RepositoryHandle,
        path: &str,
        _reference: &str,
    ) -> Result<Vec<TreeEntry>, SourceError> {
        let dir = Self::absolute(handle, path);
        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| map_io(e, &dir))?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(dir = %dir.display(), name = ?raw, "Skipping entry with non UTF-8 name");
                    continue;
                }
            };
            if self.is_ignored(&name) {
                debug!(entry = %name, "Skipping ignored entry");
                continue;
            }
            let kind = if entry.file_type().await?.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let rel = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}/{name}")
            };
            entries.push(TreeEntry {
                name,
                path: rel,
                kind,
            });
        }
        Ok(entries)
    }

    async fn fetch_file(
        &self,
        handle: &RepositoryHandle,
        path: &str,
        _reference: &str,
    ) -> FileBlob {
        let file = Self::absolute(handle, path);
        match tokio::fs::read(&file).await {
            Ok(bytes) => FileBlob::present(path, bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path, "File not found");
                FileBlob::absent(path)
            }
            Err(e) => {
                warn!(path, error = %e, "Failed to read file");
                FileBlob::absent(path)
            }
        }
    }
}
