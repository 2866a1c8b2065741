//! High-level pipeline: resolve → README → structure pass → content pass → assemble.
//!
//! # Responsibilities
//! - Resolve the repository through the active [`SourceProvider`]; resolution errors are fatal
//!   and nothing is traversed.
//! - Run the two independent traversal passes (see [`crate::traverse`]).
//! - Concatenate preamble, README, structure and contents in a fixed order.
//!
//! # Error Handling
//! Only resolution and structure-listing failures surface as `Err`. Per-file problems are
//! already rendered in-band by the content pass.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::binary::BinaryClassifier;
use crate::contract::{FlattenedArtifact, SourceProvider};
use crate::decode::Decoder;
use crate::error::SourceError;
use crate::traverse::Traversal;

/// Ref used when neither the caller nor the backend names one.
pub const DEFAULT_BRANCH: &str = "master";

/// Flattening engine over one provider.
pub struct Flattener<P> {
    provider: P,
    classifier: BinaryClassifier,
    decoder: Decoder,
}

impl<P: SourceProvider> Flattener<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            classifier: BinaryClassifier::default(),
            decoder: Decoder::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: BinaryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Flatten one repository. `reference` falls back to the backend's default branch, then
    /// to [`DEFAULT_BRANCH`].
    #[instrument(skip(self), fields(backend = ?self.provider.kind()))]
    pub async fn process_repo(
        &self,
        identifier: &str,
        reference: Option<&str>,
    ) -> Result<FlattenedArtifact, SourceError> {
        let kind = self.provider.kind();
        let handle = self.provider.resolve(identifier).await?;
        let reference = reference
            .map(str::to_owned)
            .or_else(|| handle.default_branch.clone())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        info!(repo = %handle.name, reference = %reference, "Resolved repository");

        let readme = self.provider.find_readme(&handle, &reference).await;

        let traversal = Traversal::new(
            &self.provider,
            &handle,
            &reference,
            &self.classifier,
            &self.decoder,
        );
        let mut structure = format!("{}: {}\n", kind.structure_header(), handle.name);
        structure.push_str(&traversal.structure().await?);
        let contents = traversal.contents().await;

        let content = format!(
            "{}\n\nREADME:\n{readme}\n\n{structure}\n\n{contents}",
            kind.preamble()
        );
        info!(repo = %handle.name, bytes = content.len(), "Repository flattened");

        Ok(FlattenedArtifact {
            repository_name: handle.name,
            content,
        })
    }
}

/// Write an artifact to `<dir>/<repository_name>_contents.txt` and return the path.
pub async fn save_artifact(
    artifact: &FlattenedArtifact,
    dir: &Path,
) -> Result<PathBuf, SourceError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}_contents.txt", artifact.repository_name));
    tokio::fs::write(&path, artifact.content.as_bytes()).await?;
    info!(path = %path.display(), "Repository contents saved");
    Ok(path)
}
