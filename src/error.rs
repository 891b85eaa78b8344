//! Error types for ingestion.
//!
//! `IngestError` aborts the whole operation. `NodeError` is recorded on a single
//! node and never stops the walk.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Fatal errors returned from the top-level entry points.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source path does not exist.
    #[error("source path does not exist: {path}")]
    SourceNotFound { path: PathBuf },

    /// Generic I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source string is neither a local path nor a recognizable remote.
    #[error("could not parse '{source_str}' as a known Git URL format or slug")]
    InvalidSource { source_str: String },

    /// The remote repository could not be reached.
    #[error("repository {url} does not exist or is not accessible: {message}")]
    RepositoryUnavailable { url: String, message: String },

    /// A git command ran but exited unsuccessfully.
    #[error("{command} failed: {output}")]
    Git { command: String, output: String },

    /// The git binary could not be launched.
    #[error("failed to launch git: {0}")]
    GitProcess(#[source] std::io::Error),

    /// Writing the digest failed.
    #[error("failed to write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::SourceNotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Kind of node-local failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeErrorKind {
    /// Directory entries could not be listed.
    ReadDir,
    /// Entry metadata could not be read.
    Metadata,
    /// The text-detection probe failed.
    TextDetection,
    /// File content could not be read.
    ReadContent,
}

/// Non-fatal failure recorded on the node it happened to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeError {
    pub kind: NodeErrorKind,
    pub message: String,
}

impl NodeError {
    pub fn new(kind: NodeErrorKind, error: &std::io::Error) -> Self {
        let message = match kind {
            NodeErrorKind::ReadDir => format!("failed to read directory: {error}"),
            NodeErrorKind::Metadata => format!("could not get file info: {error}"),
            NodeErrorKind::TextDetection => format!("error checking if file is text: {error}"),
            NodeErrorKind::ReadContent => format!("error reading file content: {error}"),
        };
        Self { kind, message }
    }
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
