/// # repo2llm CLI Interface (Module)
///
/// Command parsing and orchestration for the `repo2llm` binary. All flattening logic lives in
/// [`repo2llm-core`]; this module only loads settings, builds the service and routes one
/// subcommand to it.
///
/// ## Output
/// - stdout carries the artifact, or the failure string when no artifact was produced.
/// - A failure string also makes [`run`] return `Err`, so the process exits non-zero.
/// - Logs go through `tracing` (stderr, filtered by `RUST_LOG`).
///
/// [`repo2llm-core`]: ../../repo2llm-core/
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use repo2llm_core::config::Settings;
use repo2llm_core::{save_artifact, FlattenedArtifact, RepoService, ServiceError};
use std::path::{Path, PathBuf};

/// CLI for repo2llm: flatten a repository into one LLM-ready text artifact.
#[derive(Parser)]
#[clap(
    name = "repo2llm",
    version,
    about = "Flatten a GitHub, GitLab or local repository into a single text artifact for LLM analysis"
)]
pub struct Cli {
    /// Optional YAML settings file (API hosts, timeouts, ignore lists)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flatten a GitHub repository (needs GITHUB_TOKEN)
    Github {
        /// Repository URL, e.g. https://github.com/owner/repo
        repo_url: String,
        /// Branch, tag or commit; defaults to the configured default branch
        #[clap(long)]
        branch: Option<String>,
        /// Also write `<repo>_contents.txt` into this directory
        #[clap(long)]
        save: Option<PathBuf>,
    },
    /// Flatten a GitLab project (needs GITLAB_TOKEN)
    Gitlab {
        /// Project URL, e.g. https://gitlab.com/group/subgroup/project
        repo_url: String,
        #[clap(long)]
        branch: Option<String>,
        #[clap(long)]
        save: Option<PathBuf>,
    },
    /// Flatten a directory on local disk
    Local {
        repo_path: String,
        #[clap(long)]
        save: Option<PathBuf>,
    },
}

/// Async CLI entrypoint, shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let settings = match &cli.config {
        Some(path) => load_config(path)?,
        None => Settings::default(),
    };
    settings.trace_loaded();
    let service = RepoService::from_env(settings);

    let (command, result, save) = match cli.command {
        Commands::Github {
            repo_url,
            branch,
            save,
        } => (
            "github",
            service.flatten_github(&repo_url, branch.as_deref()).await,
            save,
        ),
        Commands::Gitlab {
            repo_url,
            branch,
            save,
        } => (
            "gitlab",
            service.flatten_gitlab(&repo_url, branch.as_deref()).await,
            save,
        ),
        Commands::Local { repo_path, save } => {
            ("local", service.flatten_local(&repo_path).await, save)
        }
    };

    emit(command, result, save.as_deref()).await
}

async fn emit(
    command: &str,
    result: Result<FlattenedArtifact, ServiceError>,
    save: Option<&Path>,
) -> Result<()> {
    match result {
        Ok(artifact) => {
            if let Some(dir) = save {
                let path = save_artifact(&artifact, dir).await?;
                tracing::info!(command, path = %path.display(), "Artifact saved");
            }
            tracing::info!(
                command,
                repo = %artifact.repository_name,
                bytes = artifact.content.len(),
                "Flattening complete"
            );
            println!("{}", artifact.content);
            Ok(())
        }
        Err(e) => {
            tracing::error!(command, error = %e, "Flattening failed");
            println!("{e}");
            Err(anyhow::Error::new(e))
        }
    }
}
