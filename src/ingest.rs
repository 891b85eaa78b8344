//! Source resolution: local paths are walked directly, remote sources are
//! fetched into a scratch directory first.

use std::path::Path;

use crate::error::Result;
use crate::git::{GitFetcher, RemoteFetcher, RemoteSource, is_remote_source};
use crate::tree::{Digest, IngestionOptions, TreeWalker};

/// Ingest `options.source` using git for remote sources.
pub fn ingest(options: &IngestionOptions) -> Result<Digest> {
    ingest_with(options, &GitFetcher::default())
}

/// Ingest `options.source`, delegating remote sources to `fetcher`.
pub fn ingest_with<F>(options: &IngestionOptions, fetcher: &F) -> Result<Digest>
where
    F: RemoteFetcher + ?Sized,
{
    if is_remote_source(&options.source) {
        ingest_remote(options, fetcher)
    } else {
        TreeWalker::new(options).walk(Path::new(&options.source))
    }
}

fn ingest_remote<F>(options: &IngestionOptions, fetcher: &F) -> Result<Digest>
where
    F: RemoteFetcher + ?Sized,
{
    tracing::info!(source = %options.source, "Processing Git URL");
    let remote =
        RemoteSource::parse(&options.source)?.with_branch_override(options.branch.as_deref());

    // Dropping `fetched` removes the checkout on every path out of this function.
    let fetched = fetcher.fetch(&remote)?;
    let mut digest = TreeWalker::new(options).walk(fetched.root())?;

    digest.root.name = remote.display_name();
    digest.remote = Some(remote);
    Ok(digest)
}
