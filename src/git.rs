//! Git repository integration
//!
//! Remote sources are parsed into a `RemoteSource`, probed with libgit2 and
//! then materialized by the `git` binary into a scratch directory that lives
//! exactly as long as the returned `FetchedTree`.

use std::cell::Cell;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use git2::{Cred, CredentialType, Direction, Remote, RemoteCallbacks, RemoteConnection};
use regex::Regex;
use serde::Serialize;
use tempfile::TempDir;

use crate::error::{IngestError, Result};

/// Hosts recognized in scheme-less sources such as `github.com/user/repo`.
pub const KNOWN_GIT_HOSTS: &[&str] = &[
    "github.com",
    "gitlab.com",
    "bitbucket.org",
    "gitea.com",
    "codeberg.org",
];

static SSH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:ssh://)?git@([\w.-]+)[:/]([\w.-]+)/([\w.-]+?)(?:\.git)?(?:/(tree|blob)/([\w.-]+)/?(.*))?$",
    )
    .expect("SSH_URL regex is invalid")
});

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://([\w.-]+)/([\w.-]+)/([\w.-]+?)(?:\.git)?(?:/(tree|blob)/([\w.-]+)/?(.*))?$",
    )
    .expect("HTTP_URL regex is invalid")
});

static FILE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^file://(?:.*/)?([\w.-]+)/([\w.-]+?)(?:\.git)?/?$").expect("FILE_URL regex is invalid")
});

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w.-]+)/([\w.-]+)$").expect("SLUG regex is invalid"));

static COMMIT_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,40}$").expect("COMMIT_HASH regex is invalid"));

/// Whether a ref in a URL pointed at a directory or a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Tree,
    Blob,
}

/// A parsed remote repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSource {
    /// Clone URL.
    pub url: String,
    pub host: String,
    pub user: String,
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Always starts with `/`; `/` alone means the whole repository.
    pub subpath: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_kind: Option<RefKind>,
    pub is_ssh: bool,
}

impl RemoteSource {
    /// Parse a URL, SSH spec, host-prefixed path or `user/repo` slug.
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();

        if let Some(caps) = SSH_URL.captures(source) {
            let mut parsed = Self::new(
                format!("git@{}:{}/{}.git", &caps[1], &caps[2], &caps[3]),
                &caps[1],
                &caps[2],
                &caps[3],
            );
            parsed.is_ssh = true;
            parsed.apply_ref(&caps);
            return Ok(parsed);
        }

        if let Some(caps) = FILE_URL.captures(source) {
            return Ok(Self::new(source.to_string(), "localhost", &caps[1], &caps[2]));
        }

        let with_scheme = if !source.starts_with("http://")
            && !source.starts_with("https://")
            && has_host_prefix(source)
        {
            format!("https://{source}")
        } else {
            source.to_string()
        };

        if let Some(caps) = HTTP_URL.captures(&with_scheme) {
            let mut parsed = Self::new(
                format!("https://{}/{}/{}.git", &caps[1], &caps[2], &caps[3]),
                &caps[1],
                &caps[2],
                &caps[3],
            );
            parsed.apply_ref(&caps);
            return Ok(parsed);
        }

        if let Some(caps) = SLUG.captures(source) {
            return Ok(Self::new(
                format!("https://github.com/{}/{}.git", &caps[1], &caps[2]),
                "github.com",
                &caps[1],
                &caps[2],
            ));
        }

        Err(IngestError::InvalidSource {
            source_str: source.to_string(),
        })
    }

    fn new(url: String, host: &str, user: &str, repo: &str) -> Self {
        Self {
            url,
            host: host.to_string(),
            user: user.to_string(),
            repo: repo.to_string(),
            branch: None,
            commit: None,
            subpath: "/".to_string(),
            ref_kind: None,
            is_ssh: false,
        }
    }

    fn apply_ref(&mut self, caps: &regex::Captures<'_>) {
        let Some(kind) = caps.get(4) else {
            return;
        };
        self.ref_kind = Some(if kind.as_str() == "blob" {
            RefKind::Blob
        } else {
            RefKind::Tree
        });
        if let Some(reference) = caps.get(5).map(|m| m.as_str().to_string()) {
            if COMMIT_HASH.is_match(&reference) {
                self.commit = Some(reference);
            } else {
                self.branch = Some(reference);
            }
        }
        if let Some(path) = caps.get(6).map(|m| m.as_str().trim_matches('/')) {
            if !path.is_empty() {
                self.subpath = format!("/{path}");
            }
        }
    }

    /// A branch given on the command line wins over whatever the URL named.
    pub fn with_branch_override(mut self, branch: Option<&str>) -> Self {
        if let Some(branch) = branch.filter(|b| !b.is_empty()) {
            self.branch = Some(branch.to_string());
            self.commit = None;
        }
        self
    }

    pub fn has_subpath(&self) -> bool {
        !self.subpath.is_empty() && self.subpath != "/"
    }

    /// Subpath relative to the checkout root, without slashes at either end.
    pub fn relative_subpath(&self) -> &str {
        self.subpath.trim_matches('/')
    }

    /// `user/repo`, followed by the subpath when one was requested.
    pub fn display_name(&self) -> String {
        let base = format!("{}/{}", self.user, self.repo);
        if self.has_subpath() {
            format!("{base}/{}", self.relative_subpath())
        } else {
            base
        }
    }
}

/// `github.com/user/repo` style: a hostname-looking first segment.
fn has_host_prefix(source: &str) -> bool {
    let Some((first, rest)) = source.split_once('/') else {
        return false;
    };
    if rest.is_empty() || first.starts_with('.') {
        return false;
    }
    KNOWN_GIT_HOSTS
        .iter()
        .any(|host| host.eq_ignore_ascii_case(first))
        || (first.contains('.') && rest.contains('/'))
}

/// Decide whether `source` names a remote repository rather than a local path.
///
/// Slugs that happen to exist on disk are treated as local paths.
pub fn is_remote_source(source: &str) -> bool {
    let source = source.trim();
    if ["git@", "ssh://", "http://", "https://", "file://"]
        .iter()
        .any(|scheme| source.starts_with(scheme))
    {
        return true;
    }
    if source.starts_with(['.', '/', '~']) || Path::new(source).exists() {
        return false;
    }
    SLUG.is_match(source) || has_host_prefix(source)
}

/// A fetched checkout. The scratch directory is removed when this is dropped.
#[derive(Debug)]
pub struct FetchedTree {
    scratch: TempDir,
    root: PathBuf,
}

impl FetchedTree {
    pub fn new(scratch: TempDir, root: PathBuf) -> Self {
        Self { scratch, root }
    }

    /// Path to walk: the checkout, narrowed to the requested subpath.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for FetchedTree {
    fn drop(&mut self) {
        tracing::info!(path = %self.scratch.path().display(), "Cleaning up temporary directory");
    }
}

/// Materializes a local copy of a remote tree.
pub trait RemoteFetcher {
    fn fetch(&self, source: &RemoteSource) -> Result<FetchedTree>;
}

/// Fetcher backed by libgit2 for probing and the `git` binary for cloning.
#[derive(Debug, Default, Clone)]
pub struct GitFetcher {
    /// Skip the reachability probe before cloning.
    pub skip_probe: bool,
}

impl RemoteFetcher for GitFetcher {
    fn fetch(&self, source: &RemoteSource) -> Result<FetchedTree> {
        if !self.skip_probe {
            tracing::info!(url = %source.url, "Checking that repository exists");
            check_repo_exists(&source.url)?;
        }

        let scratch = tempfile::Builder::new()
            .prefix("pathdigest-clone-")
            .tempdir()
            .map_err(|source| IngestError::Io {
                path: std::env::temp_dir(),
                source,
            })?;

        let checkout = clone_repo(source, scratch.path())?;
        let root = if source.has_subpath() {
            checkout.join(source.relative_subpath())
        } else {
            checkout
        };

        Ok(FetchedTree::new(scratch, root))
    }
}

fn remote_callbacks<'a>(attempts: &'a Cell<usize>) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username, allowed| {
        attempts.set(attempts.get() + 1);
        if attempts.get() > 3 {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            let config = git2::Config::open_default()?;
            return Cred::credential_helper(&config, url, username);
        }
        Cred::default()
    });
    callbacks
}

/// Open a fetch connection to `url` and hand it to `f`.
fn with_connection<T>(
    url: &str,
    f: impl FnOnce(&RemoteConnection<'_, '_, '_>) -> std::result::Result<T, git2::Error>,
) -> Result<T> {
    let unavailable = |e: git2::Error| IngestError::RepositoryUnavailable {
        url: url.to_string(),
        message: e.message().to_string(),
    };
    let attempts = Cell::new(0);
    let mut remote = Remote::create_detached(url).map_err(unavailable)?;
    let connection = remote
        .connect_auth(Direction::Fetch, Some(remote_callbacks(&attempts)), None)
        .map_err(unavailable)?;
    f(&connection).map_err(unavailable)
}

/// Equivalent of `git ls-remote`: succeeds when the remote answers.
pub fn check_repo_exists(url: &str) -> Result<()> {
    with_connection(url, |_| Ok(()))
}

/// Branch names advertised by the remote, in advertisement order.
pub fn list_remote_branches(url: &str) -> Result<Vec<String>> {
    with_connection(url, |connection| {
        Ok(connection
            .list()?
            .iter()
            .filter_map(|head| head.name().strip_prefix("refs/heads/"))
            .map(str::to_string)
            .collect())
    })
}

/// Clone `source` below `scratch` and return the checkout directory.
///
/// Without a commit the clone is shallow and single-branch. With a subpath it
/// is blob-less and sparse, narrowed to the subpath (or, for a blob, the
/// directory holding the file).
pub fn clone_repo(source: &RemoteSource, scratch: &Path) -> Result<PathBuf> {
    let target = scratch.join(&source.repo);
    let partial = source.has_subpath();

    let mut args: Vec<&OsStr> = vec![OsStr::new("clone")];
    if partial {
        args.extend([OsStr::new("--filter=blob:none"), OsStr::new("--sparse")]);
    }
    if source.commit.is_none() {
        args.extend([OsStr::new("--depth=1"), OsStr::new("--single-branch")]);
        if let Some(branch) = &source.branch {
            args.extend([OsStr::new("--branch"), OsStr::new(branch.as_str())]);
        }
    }
    args.extend([OsStr::new(source.url.as_str()), target.as_os_str()]);

    tracing::info!(
        url = %source.url,
        branch = source.branch.as_deref().unwrap_or(""),
        commit = source.commit.as_deref().unwrap_or(""),
        subpath = %source.subpath,
        path = %target.display(),
        "Cloning repository"
    );
    run_git(&args)?;

    if let Some(commit) = &source.commit {
        run_git(&[
            OsStr::new("-C"),
            target.as_os_str(),
            OsStr::new("checkout"),
            OsStr::new(commit.as_str()),
        ])?;
    }

    if partial {
        let mut sparse = source.relative_subpath();
        if source.ref_kind == Some(RefKind::Blob) {
            sparse = sparse.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        }
        if !sparse.is_empty() {
            run_git(&[
                OsStr::new("-C"),
                target.as_os_str(),
                OsStr::new("sparse-checkout"),
                OsStr::new("set"),
                OsStr::new(sparse),
            ])?;
        }
    }

    Ok(target)
}

fn run_git(args: &[&OsStr]) -> Result<()> {
    let command = format!(
        "git {}",
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    tracing::debug!(command = %command, "Running git");

    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(IngestError::GitProcess)?;

    if output.status.success() {
        return Ok(());
    }
    let mut combined = String::from_utf8_lossy(&output.stderr).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    Err(IngestError::Git {
        command,
        output: combined.trim().to_string(),
    })
}
