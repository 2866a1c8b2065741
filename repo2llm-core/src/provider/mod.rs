//! Concrete [`SourceProvider`](crate::contract::SourceProvider) implementations.
//!
//! - [`github`]: GitHub REST contents API
//! - [`gitlab`]: GitLab v4 repository API
//! - [`local`]: a directory on local disk

pub mod github;
pub mod gitlab;
pub mod local;

pub use github::GithubProvider;
pub use gitlab::GitlabProvider;
pub use local::LocalProvider;

use reqwest::{Response, StatusCode};

use crate::error::SourceError;

const USER_AGENT: &str = concat!("repo2llm/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for the remote providers.
pub(crate) fn http_client() -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Pass successful responses through, map everything else onto the error taxonomy.
pub(crate) async fn check_status(response: Response, what: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let quota_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0");
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    tracing::debug!(status = %status, what, message = %message, "Backend returned error status");

    Err(match status {
        StatusCode::NOT_FOUND => SourceError::NotFound(format!("{what}: {message}")),
        StatusCode::UNAUTHORIZED => SourceError::AuthRequired(format!("{what}: {message}")),
        StatusCode::FORBIDDEN if quota_exhausted => {
            SourceError::RateLimited(format!("{what}: {message}"))
        }
        StatusCode::FORBIDDEN => SourceError::AuthRequired(format!("{what}: {message}")),
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited(format!("{what}: {message}")),
        s if s.is_server_error() => SourceError::Unavailable(format!("{what}: HTTP {s}")),
        s => SourceError::UnexpectedResponse(format!("{what}: HTTP {s} {message}")),
    })
}

/// Both GitHub and GitLab put a human-readable reason under `message`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .map(|m| m.as_str().map(str::to_owned).unwrap_or_else(|| m.to_string()))
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Strip scheme, expected host, trailing slashes and `.git` from a repository URL.
///
/// Returns the remaining path segments. Bare `namespace/repo` identifiers pass through.
pub(crate) fn repository_segments(
    identifier: &str,
    host: &str,
) -> Result<Vec<String>, SourceError> {
    let trimmed = identifier.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SourceError::InvalidIdentifier("empty repository URL".into()));
    }
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    let path = match without_scheme {
        Some(rest) => rest.strip_prefix(host).and_then(|r| r.strip_prefix('/')).ok_or_else(
            || SourceError::InvalidIdentifier(format!("{identifier} is not a {host} URL")),
        )?,
        None => trimmed
            .strip_prefix(host)
            .and_then(|r| r.strip_prefix('/'))
            .unwrap_or(trimmed),
    };
    let path = path.strip_suffix(".git").unwrap_or(path);
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if segments.len() < 2 {
        return Err(SourceError::InvalidIdentifier(format!(
            "{identifier} does not name a repository"
        )));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_url_is_split_into_segments() {
        let segs = repository_segments("https://github.com/owner/repo", "github.com").unwrap();
        assert_eq!(segs, vec!["owner", "repo"]);
    }

    #[test]
    fn trailing_slash_and_git_suffix_are_ignored() {
        let segs = repository_segments("https://github.com/owner/repo.git/", "github.com").unwrap();
        assert_eq!(segs, vec!["owner", "repo"]);
    }

    #[test]
    fn bare_path_and_hostless_url_are_accepted() {
        assert_eq!(
            repository_segments("owner/repo", "github.com").unwrap(),
            vec!["owner", "repo"]
        );
        assert_eq!(
            repository_segments("gitlab.com/group/sub/proj", "gitlab.com").unwrap(),
            vec!["group", "sub", "proj"]
        );
    }

    #[test]
    fn foreign_host_and_short_paths_are_rejected() {
        assert!(matches!(
            repository_segments("https://example.com/owner/repo", "github.com"),
            Err(SourceError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            repository_segments("https://github.com/owner", "github.com"),
            Err(SourceError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            repository_segments("  ", "github.com"),
            Err(SourceError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn error_message_prefers_json_message_field() {
        assert_eq!(error_message(r#"{"message":"Not Found"}"#), "Not Found");
        assert_eq!(error_message("plain text"), "plain text");
    }
}
