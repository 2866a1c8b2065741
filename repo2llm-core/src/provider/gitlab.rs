//! GitLab provider over the v4 REST API.
//!
//! - `resolve`: `GET /api/v4/projects/{url-encoded namespace/path}`
//! - `list_children`: `GET /api/v4/projects/{id}/repository/tree`, following `x-next-page`
//! - `fetch_file`: `GET /api/v4/projects/{id}/repository/files/{url-encoded path}`

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GitlabSettings;
use crate::contract::{BackendKind, FileBlob, RepositoryHandle, SourceProvider, TreeEntry};
use crate::error::SourceError;
use crate::provider::{check_status, http_client, repository_segments};

const PER_PAGE: &str = "100";

#[derive(Debug, Deserialize)]
struct Project {
    id: u64,
    path_with_namespace: String,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryFile {
    encoding: Option<String>,
    content: Option<String>,
}

pub struct GitlabProvider {
    client: reqwest::Client,
    base_url: String,
    web_host: String,
    token: String,
}

impl GitlabProvider {
    pub const TOKEN_ENV: &'static str = "GITLAB_TOKEN";

    pub fn new(token: String, settings: &GitlabSettings) -> Result<Self, SourceError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|e| SourceError::InvalidIdentifier(format!("bad GitLab base URL: {e}")))?;
        let web_host = match (base.host_str(), base.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(SourceError::InvalidIdentifier(format!(
                    "GitLab base URL {} has no host",
                    settings.base_url
                )))
            }
        };
        Ok(Self {
            client: http_client()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            web_host,
            token,
        })
    }

    /// Build the provider from `GITLAB_TOKEN`. A missing token is fatal for this provider.
    pub fn new_from_env(settings: &GitlabSettings) -> Result<Self, SourceError> {
        match std::env::var(Self::TOKEN_ENV) {
            Ok(token) if !token.is_empty() => {
                info!(base_url = %settings.base_url, "Initialized GitLab provider from environment");
                Self::new(token, settings)
            }
            _ => {
                tracing::error!("{} missing in environment", Self::TOKEN_ENV);
                Err(SourceError::MissingCredential(Self::TOKEN_ENV))
            }
        }
    }

    /// `{base}/api/v4/projects/<segments...>`; each segment is percent-encoded, so a
    /// segment containing `/` becomes `%2F` as the API requires.
    fn project_url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SourceError::InvalidIdentifier(format!("bad GitLab base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidIdentifier("GitLab base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["api", "v4", "projects"])
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url, what: &str) -> Result<reqwest::Response, SourceError> {
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        check_status(response, what).await
    }

    async fn try_fetch(
        &self,
        handle: &RepositoryHandle,
        path: &str,
        reference: &str,
    ) -> Result<Option<Vec<u8>>, SourceError> {
        let mut url = self.project_url(&[handle.locator.as_str(), "repository", "files", path])?;
        url.query_pairs_mut().append_pair("ref", reference);
        let file: RepositoryFile = self
            .get(url, "file")
            .await?
            .json()
            .await
            .map_err(|e| SourceError::UnexpectedResponse(format!("file {path}: {e}")))?;
        match (file.encoding.as_deref(), file.content) {
            (Some("base64"), Some(content)) => {
                let compact: String = content.split_whitespace().collect();
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map_err(|e| SourceError::UnexpectedResponse(format!("file {path}: {e}")))?;
                Ok(Some(bytes))
            }
            (Some("text"), Some(content)) => Ok(Some(content.into_bytes())),
            (encoding, _) => {
                debug!(path, encoding = ?encoding, "File has no usable encoding");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl SourceProvider for GitlabProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::GitLab
    }

    async fn resolve(&self, identifier: &str) -> Result<RepositoryHandle, SourceError> {
        let mut segments = repository_segments(identifier, &self.web_host)?;
        // Web URLs such as `group/proj/-/tree/main` carry a `-` separator before the route.
        if let Some(dash) = segments.iter().position(|s| s == "-") {
            segments.truncate(dash);
        }
        let name = segments
            .last()
            .cloned()
            .ok_or_else(|| SourceError::InvalidIdentifier(identifier.to_string()))?;
        let full_path = segments.join("/");
        let url = self.project_url(&[full_path.as_str()])?;
        let project: Project = self
            .get(url, "project")
            .await?
            .json()
            .await
            .map_err(|e| SourceError::UnexpectedResponse(format!("project: {e}")))?;
        info!(
            project = %project.path_with_namespace,
            id = project.id,
            default_branch = ?project.default_branch,
            "Resolved GitLab project"
        );
        Ok(RepositoryHandle {
            name,
            locator: project.id.to_string(),
            default_branch: project.default_branch,
        })
    }

    async fn list_children(
        &self,
        handle: &RepositoryHandle,
        path: &str,
        reference: &str,
    ) -> Result<Vec<TreeEntry>, SourceError> {
        let mut entries = Vec::new();
        let mut page = String::from("1");
        loop {
            let mut url = self.project_url(&[handle.locator.as_str(), "repository", "tree"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("ref", reference);
                if !path.is_empty() {
                    query.append_pair("path", path);
                }
                query.append_pair("per_page", PER_PAGE);
                query.append_pair("page", &page);
            }
            let response = self.get(url, "tree").await?;
            let next_page = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned);
            let items: Vec<TreeItem> = response
                .json()
                .await
                .map_err(|e| SourceError::UnexpectedResponse(format!("tree {path:?}: {e}")))?;
            let fetched = items.len();
            entries.extend(items.into_iter().map(|item| match item.kind.as_str() {
                "tree" => TreeEntry::directory(item.name, item.path),
                _ => TreeEntry::file(item.name, item.path),
            }));
            match next_page {
                Some(next) if fetched > 0 => page = next,
                _ => break,
            }
        }
        Ok(entries)
    }

    async fn fetch_file(
        &self,
        handle: &RepositoryHandle,
        path: &str,
        reference: &str,
    ) -> FileBlob {
        match self.try_fetch(handle, path, reference).await {
            Ok(Some(bytes)) => FileBlob::present(path, bytes),
            Ok(None) => FileBlob::absent(path),
            Err(SourceError::NotFound(_)) => {
                debug!(path, "File not found");
                FileBlob::absent(path)
            }
            Err(e) => {
                warn!(path, error = %e, "Failed to fetch file");
                FileBlob::absent(path)
            }
        }
    }
}
