use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Everything the boundary operations need besides credentials.
///
/// Every field has a default, so an empty YAML document is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub github: GithubSettings,
    pub gitlab: GitlabSettings,
    pub local: LocalSettings,
    pub timeouts: TimeoutSettings,
    pub decode: DecodeSettings,
    pub binary: BinarySettings,
    /// Branch used by the remote entry points when the caller names none.
    pub default_branch: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github: GithubSettings::default(),
            gitlab: GitlabSettings::default(),
            local: LocalSettings::default(),
            timeouts: TimeoutSettings::default(),
            decode: DecodeSettings::default(),
            binary: BinarySettings::default(),
            default_branch: crate::flatten::DEFAULT_BRANCH.to_string(),
        }
    }
}

impl Settings {
    pub fn trace_loaded(&self) {
        info!(
            github_api = %self.github.api_base_url,
            gitlab = %self.gitlab.base_url,
            remote_timeout_secs = self.timeouts.remote_secs,
            local_timeout_secs = self.timeouts.local_secs,
            default_branch = %self.default_branch,
            "Loaded Settings"
        );
        debug!(?self, "Settings loaded (full debug)");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    pub api_base_url: String,
    /// Host accepted in repository URLs.
    pub web_host: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            web_host: "github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitlabSettings {
    /// Instance root; the API lives under `/api/v4` and repository URLs use its host.
    pub base_url: String,
}

impl Default for GitlabSettings {
    fn default() -> Self {
        Self {
            base_url: "https://gitlab.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub extra_ignored_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub remote_secs: u64,
    pub local_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            remote_secs: 3000,
            local_secs: 300,
        }
    }
}

impl TimeoutSettings {
    pub fn remote(&self) -> Duration {
        Duration::from_secs(self.remote_secs)
    }

    pub fn local(&self) -> Duration {
        Duration::from_secs(self.local_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeSettings {
    /// Retry undecodable UTF-8 as Latin-1 instead of skipping the file.
    pub latin1_fallback: bool,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            latin1_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarySettings {
    pub extra_suffixes: Vec<String>,
}
