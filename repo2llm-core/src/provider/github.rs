//! GitHub provider over the REST contents API.
//!
//! - `resolve`: `GET /repos/{owner}/{repo}`
//! - `list_children` / `fetch_file`: `GET /repos/{owner}/{repo}/contents/{path}?ref=...`
//!
//! The contents API returns file bodies base64-encoded. Large files come back with
//! `encoding: "none"` and no body; those degrade to an absent blob.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GithubSettings;
use crate::contract::{BackendKind, FileBlob, RepositoryHandle, SourceProvider, TreeEntry};
use crate::error::SourceError;
use crate::provider::{check_status, http_client, repository_segments};

#[derive(Debug, Deserialize)]
struct RepoInfo {
    full_name: String,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    encoding: Option<String>,
    content: Option<String>,
}

pub struct GithubProvider {
    client: reqwest::Client,
    api_base_url: String,
    web_host: String,
    token: String,
}

impl GithubProvider {
    pub const TOKEN_ENV: &'static str = "GITHUB_TOKEN";

    pub fn new(token: String, settings: &GithubSettings) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client()?,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            web_host: settings.web_host.clone(),
            token,
        })
    }

    /// Build the provider from `GITHUB_TOKEN`. A missing token is fatal for this provider.
    pub fn new_from_env(settings: &GithubSettings) -> Result<Self, SourceError> {
        match std::env::var(Self::TOKEN_ENV) {
            Ok(token) if !token.is_empty() => {
                info!(api = %settings.api_base_url, "Initialized GitHub provider from environment");
                Self::new(token, settings)
            }
            _ => {
                tracing::error!("{} missing in environment", Self::TOKEN_ENV);
                Err(SourceError::MissingCredential(Self::TOKEN_ENV))
            }
        }
    }

    fn api_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.api_base_url)
            .map_err(|e| SourceError::InvalidIdentifier(format!("bad API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidIdentifier("API base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn contents_url(
        &self,
        handle: &RepositoryHandle,
        path: &str,
        reference: &str,
    ) -> Result<Url, SourceError> {
        let mut segments = vec!["repos"];
        segments.extend(handle.locator.split('/'));
        segments.push("contents");
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let mut url = self.api_url(segments)?;
        url.query_pairs_mut().append_pair("ref", reference);
        Ok(url)
    }

    async fn get(&self, url: Url, what: &str) -> Result<reqwest::Response, SourceError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
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
        let url = self.contents_url(handle, path, reference)?;
        let file: ContentFile = self
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
            (encoding, _) => {
                debug!(path, encoding = ?encoding, "File has no usable encoding");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl SourceProvider for GithubProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::GitHub
    }

    async fn resolve(&self, identifier: &str) -> Result<RepositoryHandle, SourceError> {
        let segments = repository_segments(identifier, &self.web_host)?;
        let (owner, repo) = (segments[0].as_str(), segments[1].as_str());
        let url = self.api_url(["repos", owner, repo])?;
        let info: RepoInfo = self
            .get(url, "repository")
            .await?
            .json()
            .await
            .map_err(|e| SourceError::UnexpectedResponse(format!("repository: {e}")))?;
        info!(repo = %info.full_name, default_branch = ?info.default_branch, "Resolved GitHub repository");
        Ok(RepositoryHandle {
            name: repo.to_string(),
            locator: info.full_name,
            default_branch: info.default_branch,
        })
    }

    async fn list_children(
        &self,
        handle: &RepositoryHandle,
        path: &str,
        reference: &str,
    ) -> Result<Vec<TreeEntry>, SourceError> {
        let url = self.contents_url(handle, path, reference)?;
        let items: Vec<ContentItem> = self
            .get(url, "directory")
            .await?
            .json()
            .await
            .map_err(|e| SourceError::UnexpectedResponse(format!("directory {path:?}: {e}")))?;
        Ok(items
            .into_iter()
            .map(|item| match item.kind.as_str() {
                "dir" => TreeEntry::directory(item.name, item.path),
                _ => TreeEntry::file(item.name, item.path),
            })
            .collect())
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

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn provider(server: &Server) -> GithubProvider {
        let settings = GithubSettings {
            api_base_url: server.url(),
            ..GithubSettings::default()
        };
        GithubProvider::new("test-token".to_string(), &settings).unwrap()
    }

    fn handle() -> RepositoryHandle {
        RepositoryHandle {
            name: "repo".into(),
            locator: "owner/repo".into(),
            default_branch: Some("main".into()),
        }
    }

    #[tokio::test]
    async fn resolve_reads_repository_metadata() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/owner/repo")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"repo","full_name":"owner/repo","default_branch":"main"}"#)
            .expect(1)
            .create_async()
            .await;

        let handle = provider(&server)
            .resolve("https://github.com/owner/repo")
            .await
            .unwrap();
        assert_eq!(handle.name, "repo");
        assert_eq!(handle.locator, "owner/repo");
        assert_eq!(handle.default_branch.as_deref(), Some("main"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn resolve_maps_status_codes() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/owner/missing")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/owner/private")
            .with_status(401)
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/owner/busy")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .create_async()
            .await;

        let provider = provider(&server);
        assert!(matches!(
            provider.resolve("owner/missing").await,
            Err(SourceError::NotFound(_))
        ));
        assert!(matches!(
            provider.resolve("owner/private").await,
            Err(SourceError::AuthRequired(_))
        ));
        assert!(matches!(
            provider.resolve("owner/busy").await,
            Err(SourceError::RateLimited(_))
        ));
        assert!(matches!(
            provider.resolve("https://gitlab.com/owner/repo").await,
            Err(SourceError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn list_children_maps_dirs_and_files() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/owner/repo/contents/src")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"name":"lib.rs","path":"src/lib.rs","type":"file"},
                    {"name":"bin","path":"src/bin","type":"dir"},
                    {"name":"vendored","path":"src/vendored","type":"submodule"}]"#,
            )
            .create_async()
            .await;

        let entries = provider(&server)
            .list_children(&handle(), "src", "main")
            .await
            .unwrap();
        assert_eq!(
            entries,
            vec![
                TreeEntry::file("lib.rs", "src/lib.rs"),
                TreeEntry::directory("bin", "src/bin"),
                TreeEntry::file("vendored", "src/vendored"),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_file_decodes_base64_and_degrades_without_encoding() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/owner/repo/contents/a.txt")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"encoding":"base64","content":"aGVs\nbG8="}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/owner/repo/contents/big.txt")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"encoding":"none","content":""}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/owner/repo/contents/flaky.txt")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let provider = provider(&server);
        let blob = provider.fetch_file(&handle(), "a.txt", "main").await;
        assert_eq!(blob.bytes.as_deref(), Some(&b"hello"[..]));
        assert_eq!(provider.fetch_file(&handle(), "big.txt", "main").await.bytes, None);
        assert_eq!(provider.fetch_file(&handle(), "flaky.txt", "main").await.bytes, None);
    }

    #[tokio::test]
    async fn find_readme_probes_candidates_in_order() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/owner/repo/contents/README.md")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/owner/repo/contents/readme.md")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"encoding":"base64","content":"aGk="}"#)
            .create_async()
            .await;

        let readme = provider(&server).find_readme(&handle(), "main").await;
        assert_eq!(readme, "hi");
    }

    #[test]
    #[serial_test::serial]
    fn missing_token_is_a_fatal_init_error() {
        std::env::remove_var(GithubProvider::TOKEN_ENV);
        let err = GithubProvider::new_from_env(&GithubSettings::default())
            .err()
            .expect("missing token must fail");
        assert!(matches!(err, SourceError::MissingCredential("GITHUB_TOKEN")));
    }
}
