use std::time::Duration;

use async_trait::async_trait;
use repo2llm_core::contract::{BackendKind, FileBlob, RepositoryHandle, SourceProvider, TreeEntry};
use repo2llm_core::service::{flatten_with_timeout, LOCAL_TIMEOUT_MESSAGE, REMOTE_TIMEOUT_MESSAGE};
use repo2llm_core::{Flattener, ServiceError, SourceError};

/// Provider whose every listing stalls.
struct Stalled {
    delay: Duration,
}

#[async_trait]
impl SourceProvider for Stalled {
    fn kind(&self) -> BackendKind {
        BackendKind::GitHub
    }

    async fn resolve(&self, identifier: &str) -> Result<RepositoryHandle, SourceError> {
        Ok(RepositoryHandle {
            name: identifier.to_string(),
            locator: identifier.to_string(),
            default_branch: None,
        })
    }

    async fn list_children(
        &self,
        _handle: &RepositoryHandle,
        _path: &str,
        _reference: &str,
    ) -> Result<Vec<TreeEntry>, SourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![])
    }

    async fn fetch_file(&self, _handle: &RepositoryHandle, path: &str, _reference: &str) -> FileBlob {
        FileBlob::absent(path)
    }
}

#[tokio::test]
async fn slow_traversal_yields_timeout_message() {
    let flattener = Flattener::new(Stalled {
        delay: Duration::from_secs(30),
    });

    let err = flatten_with_timeout(
        &flattener,
        "slow",
        None,
        Duration::from_millis(50),
        REMOTE_TIMEOUT_MESSAGE,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Timeout(_)));
    assert_eq!(
        err.to_string(),
        "Processing timeout, please check repository size or network connection"
    );
}

#[tokio::test]
async fn fast_traversal_finishes_within_limit() {
    let flattener = Flattener::new(Stalled {
        delay: Duration::from_millis(1),
    });

    let artifact = flatten_with_timeout(
        &flattener,
        "quick",
        Some("main"),
        Duration::from_secs(10),
        LOCAL_TIMEOUT_MESSAGE,
    )
    .await
    .unwrap();
    assert_eq!(artifact.repository_name, "quick");
    assert!(artifact.content.contains("repo structure: quick\n"));
}

#[tokio::test]
async fn processing_errors_are_prefixed() {
    let err = flatten_with_timeout(
        &Flattener::new(repo2llm_core::provider::LocalProvider::new()),
        "",
        None,
        Duration::from_secs(10),
        LOCAL_TIMEOUT_MESSAGE,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().starts_with("Processing failed: "));
}
