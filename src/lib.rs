//! pathdigest - Turn a local directory, file or Git repository into a text digest

pub mod error;
pub mod git;
pub mod ingest;
pub mod output;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{IngestError, NodeError, NodeErrorKind, Result};
pub use git::{GitFetcher, RemoteFetcher, RemoteSource, is_remote_source, list_remote_branches};
pub use ingest::{ingest, ingest_with};
pub use output::{DigestFormatter, FormattedDigest, OutputConfig, to_json};
pub use tree::{DEFAULT_MAX_FILE_SIZE, Digest, IngestionOptions, Node, NodeKind, TreeWalker};
