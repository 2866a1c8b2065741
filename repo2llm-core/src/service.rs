//! Boundary operations handed to the transport layer.
//!
//! Each entry point returns the assembled artifact or a short human-readable failure string.
//! Nothing structured crosses this boundary. A whole `process_repo` call runs under one
//! wall-clock timeout (long for remote backends, short for local disk); on expiry the call is
//! dropped and no partial artifact is returned.
//!
//! Remote providers are built once, at startup. A missing token leaves that provider
//! unavailable and every call to its entry point reports the initialisation error.

use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::binary::BinaryClassifier;
use crate::config::Settings;
use crate::contract::{FlattenedArtifact, SourceProvider};
use crate::decode::Decoder;
use crate::error::SourceError;
use crate::flatten::Flattener;
use crate::provider::{GithubProvider, GitlabProvider, LocalProvider};

pub const REMOTE_TIMEOUT_MESSAGE: &str =
    "Processing timeout, please check repository size or network connection";
pub const LOCAL_TIMEOUT_MESSAGE: &str =
    "Processing timeout, please check repository size or file count";

/// Why a boundary call produced no artifact. `Display` is the failure string.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Processing failed: {0}")]
    Failed(#[from] SourceError),

    #[error("{0}")]
    Timeout(&'static str),
}

/// Run one flattening under a deadline.
pub async fn flatten_with_timeout<P: SourceProvider>(
    flattener: &Flattener<P>,
    identifier: &str,
    reference: Option<&str>,
    limit: Duration,
    timeout_message: &'static str,
) -> Result<FlattenedArtifact, ServiceError> {
    match tokio::time::timeout(limit, flattener.process_repo(identifier, reference)).await {
        Ok(Ok(artifact)) => Ok(artifact),
        Ok(Err(e)) => {
            error!(identifier, error = %e, "Repository processing failed");
            Err(ServiceError::Failed(e))
        }
        Err(_) => {
            error!(identifier, limit_secs = limit.as_secs(), "Repository processing timed out");
            Err(ServiceError::Timeout(timeout_message))
        }
    }
}

fn flattener<P: SourceProvider>(provider: P, settings: &Settings) -> Flattener<P> {
    let classifier =
        BinaryClassifier::new().with_extra_suffixes(settings.binary.extra_suffixes.iter().cloned());
    let decoder = if settings.decode.latin1_fallback {
        Decoder::default()
    } else {
        Decoder::strict()
    };
    Flattener::new(provider)
        .with_classifier(classifier)
        .with_decoder(decoder)
}

/// The three entry points, one per backend.
pub struct RepoService {
    github: Result<Flattener<GithubProvider>, SourceError>,
    gitlab: Result<Flattener<GitlabProvider>, SourceError>,
    local: Flattener<LocalProvider>,
    settings: Settings,
}

impl RepoService {
    /// Build every provider; remote ones read their tokens from the environment.
    pub fn from_env(settings: Settings) -> Self {
        let github = GithubProvider::new_from_env(&settings.github);
        let gitlab = GitlabProvider::new_from_env(&settings.gitlab);
        Self::new(github, gitlab, settings)
    }

    pub fn new(
        github: Result<GithubProvider, SourceError>,
        gitlab: Result<GitlabProvider, SourceError>,
        settings: Settings,
    ) -> Self {
        if let Err(e) = &github {
            warn!(error = %e, "GitHub provider unavailable");
        }
        if let Err(e) = &gitlab {
            warn!(error = %e, "GitLab provider unavailable");
        }
        let local = LocalProvider::new()
            .with_extra_ignored_dirs(settings.local.extra_ignored_dirs.iter().cloned());
        info!(
            github = github.is_ok(),
            gitlab = gitlab.is_ok(),
            "Repository service initialised"
        );
        Self {
            github: github.map(|p| flattener(p, &settings)),
            gitlab: gitlab.map(|p| flattener(p, &settings)),
            local: flattener(local, &settings),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn flatten_github(
        &self,
        repo_url: &str,
        branch: Option<&str>,
    ) -> Result<FlattenedArtifact, ServiceError> {
        let flattener = self.github.as_ref().map_err(unavailable)?;
        let branch = branch.unwrap_or(self.settings.default_branch.as_str());
        flatten_with_timeout(
            flattener,
            repo_url,
            Some(branch),
            self.settings.timeouts.remote(),
            REMOTE_TIMEOUT_MESSAGE,
        )
        .await
    }

    pub async fn flatten_gitlab(
        &self,
        repo_url: &str,
        branch: Option<&str>,
    ) -> Result<FlattenedArtifact, ServiceError> {
        let flattener = self.gitlab.as_ref().map_err(unavailable)?;
        let branch = branch.unwrap_or(self.settings.default_branch.as_str());
        flatten_with_timeout(
            flattener,
            repo_url,
            Some(branch),
            self.settings.timeouts.remote(),
            REMOTE_TIMEOUT_MESSAGE,
        )
        .await
    }

    pub async fn flatten_local(&self, repo_path: &str) -> Result<FlattenedArtifact, ServiceError> {
        flatten_with_timeout(
            &self.local,
            repo_path,
            None,
            self.settings.timeouts.local(),
            LOCAL_TIMEOUT_MESSAGE,
        )
        .await
    }

    /// Artifact text, or the failure string.
    pub async fn get_github_repo(&self, repo_url: &str, branch: Option<&str>) -> String {
        into_text(self.flatten_github(repo_url, branch).await)
    }

    /// Artifact text, or the failure string.
    pub async fn get_gitlab_repo(&self, repo_url: &str, branch: Option<&str>) -> String {
        into_text(self.flatten_gitlab(repo_url, branch).await)
    }

    /// Artifact text, or the failure string.
    pub async fn get_local_repo(&self, repo_path: &str) -> String {
        into_text(self.flatten_local(repo_path).await)
    }
}

fn unavailable(e: &SourceError) -> ServiceError {
    match e {
        SourceError::MissingCredential(var) => {
            ServiceError::Failed(SourceError::MissingCredential(*var))
        }
        other => ServiceError::Failed(SourceError::Unavailable(other.to_string())),
    }
}

fn into_text(result: Result<FlattenedArtifact, ServiceError>) -> String {
    match result {
        Ok(artifact) => artifact.content,
        Err(e) => e.to_string(),
    }
}
