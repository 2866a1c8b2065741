#![doc = "repo2llm-core: repository flattening engine for repo2llm."]

//! This crate turns a GitHub repository, a GitLab project or a local directory into one
//! text artifact: an instruction preamble, the README, a structure listing and every file's
//! contents.
//!
//! # Layout
//! - [`contract`]: the [`SourceProvider`](contract::SourceProvider) trait and its data types
//! - [`provider`]: the three backends
//! - [`binary`], [`decode`]: file classification and text decoding
//! - [`traverse`], [`flatten`]: the two traversal passes and the final assembly
//! - [`service`]: string-returning entry points with timeouts, for a transport layer

pub mod binary;
pub mod config;
pub mod contract;
pub mod decode;
pub mod error;
pub mod flatten;
pub mod provider;
pub mod service;
pub mod traverse;

pub use contract::{
    BackendKind, EntryKind, FileBlob, FlattenedArtifact, RepositoryHandle, SourceProvider,
    TreeEntry,
};
pub use error::SourceError;
pub use flatten::{save_artifact, Flattener};
pub use service::{RepoService, ServiceError};
