//! Iterative depth-first traversal of a repository tree.
//!
//! Both passes share one walker: an explicit stack of [`DirectoryFrame`]s plus a visited set,
//! so tree depth never touches the call stack. A frame stays on the stack until its pending
//! entries are exhausted, and every listing is sorted by name, which makes the output a
//! lexical pre-order listing.
//!
//! Failure policy differs between the passes:
//! - structure pass: any listing error is returned to the caller;
//! - content pass: a failed listing drops that subtree, a failed fetch degrades to a
//!   placeholder line. The pass itself cannot fail.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};

use crate::binary::BinaryClassifier;
use crate::contract::{RepositoryHandle, SourceProvider, TreeEntry};
use crate::decode::{DecodeOutcome, Decoder};
use crate::error::SourceError;

/// Unit pushed on the traversal stack: a directory and the entries still to handle.
#[derive(Debug)]
pub struct DirectoryFrame {
    pub path: String,
    pub pending: VecDeque<TreeEntry>,
}

impl DirectoryFrame {
    fn new(path: String, mut children: Vec<TreeEntry>) -> Self {
        children.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        Self {
            path,
            pending: children.into(),
        }
    }
}

/// Stack and visited set for one pass.
struct Walk {
    stack: Vec<DirectoryFrame>,
    visited: HashSet<String>,
}

impl Walk {
    fn new(root_children: Vec<TreeEntry>) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
            visited: HashSet::new(),
        };
        walk.descend(String::new(), root_children);
        walk
    }

    fn next_entry(&mut self) -> Option<TreeEntry> {
        loop {
            let frame = self.stack.last_mut()?;
            match frame.pending.pop_front() {
                Some(entry) => return Some(entry),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn is_visited(&self, path: &str) -> bool {
        self.visited.contains(path)
    }

    /// Mark `path` visited and push its frame in one step.
    fn descend(&mut self, path: String, children: Vec<TreeEntry>) {
        self.visited.insert(path.clone());
        self.stack.push(DirectoryFrame::new(path, children));
    }
}

/// Traversal engine bound to one provider, repository and ref.
pub struct Traversal<'a, P: SourceProvider + ?Sized> {
    provider: &'a P,
    handle: &'a RepositoryHandle,
    reference: &'a str,
    classifier: &'a BinaryClassifier,
    decoder: &'a Decoder,
}

impl<'a, P: SourceProvider + ?Sized> Traversal<'a, P> {
    pub fn new(
        provider: &'a P,
        handle: &'a RepositoryHandle,
        reference: &'a str,
        classifier: &'a BinaryClassifier,
        decoder: &'a Decoder,
    ) -> Self {
        Self {
            provider,
            handle,
            reference,
            classifier,
            decoder,
        }
    }

    /// One line per reachable entry; directories carry a trailing slash.
    pub async fn structure(&self) -> Result<String, SourceError> {
        let kind = self.provider.kind();
        let root = self
            .provider
            .list_children(self.handle, "", self.reference)
            .await?;
        let mut walk = Walk::new(root);
        let mut structure = String::new();
        let (mut dirs, mut files) = (0usize, 0usize);

        while let Some(entry) = walk.next_entry() {
            if entry.is_dir() {
                if walk.is_visited(&entry.path) {
                    debug!(path = %entry.path, "Directory already visited, skipping");
                    continue;
                }
                debug!(path = %entry.path, "Processing directory");
                let children = self
                    .provider
                    .list_children(self.handle, &entry.path, self.reference)
                    .await?;
                structure.push_str(&kind.display_path(&entry.path));
                structure.push_str("/\n");
                walk.descend(entry.path, children);
                dirs += 1;
            } else {
                structure.push_str(&kind.display_path(&entry.path));
                structure.push('\n');
                files += 1;
            }
        }

        info!(repo = %self.handle.name, dirs, files, "Structure pass complete");
        Ok(structure)
    }

    /// One `File:` block per reachable file.
    pub async fn contents(&self) -> String {
        let root = match self
            .provider
            .list_children(self.handle, "", self.reference)
            .await
        {
            Ok(children) => children,
            Err(e) => {
                warn!(repo = %self.handle.name, error = %e, "Root listing failed during content pass");
                return String::new();
            }
        };
        let mut walk = Walk::new(root);
        let mut contents = String::new();
        let mut files = 0usize;

        while let Some(entry) = walk.next_entry() {
            if entry.is_dir() {
                if walk.is_visited(&entry.path) {
                    continue;
                }
                debug!(path = %entry.path, "Downloading directory");
                let children = match self
                    .provider
                    .list_children(self.handle, &entry.path, self.reference)
                    .await
                {
                    Ok(children) => children,
                    Err(e) => {
                        warn!(path = %entry.path, error = %e, "Listing failed, skipping subtree");
                        Vec::new()
                    }
                };
                walk.descend(entry.path, children);
            } else {
                contents.push_str(&self.file_block(&entry).await);
                files += 1;
            }
        }

        info!(repo = %self.handle.name, files, "Content pass complete");
        contents
    }

    async fn file_block(&self, entry: &TreeEntry) -> String {
        let kind = self.provider.kind();
        let shown = kind.display_path(&entry.path);

        if self.classifier.is_binary(&entry.name) {
            return format!("File: {shown}\nContent: Skipped binary file\n\n");
        }

        let blob = self
            .provider
            .fetch_file(self.handle, &entry.path, self.reference)
            .await;
        let Some(bytes) = blob.bytes else {
            warn!(path = %entry.path, "File bytes unavailable");
            return format!("File: {shown}\n{}\n\n", kind.missing_bytes_notice());
        };

        match self.decoder.decode(&bytes) {
            DecodeOutcome::Primary(text) => format!("File: {shown}\nContent:\n{text}\n\n"),
            DecodeOutcome::Fallback { encoding, text } => {
                debug!(path = %entry.path, encoding = encoding.label(), "Fallback decode");
                format!(
                    "File: {shown}\nContent ({} Decoded):\n{text}\n\n",
                    encoding.label()
                )
            }
            DecodeOutcome::Failure => {
                warn!(path = %entry.path, "No encoding accepted the file");
                format!("File: {shown}\nContent: Skipped due to unsupported encoding\n\n")
            }
        }
    }
}
