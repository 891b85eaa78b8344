//! Test utilities for building temporary source trees.
//!
//! This module is only compiled for tests, benchmarks and the `test-utils` feature.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A temporary directory tree for testing, optionally a git repository.
///
/// The directory is automatically cleaned up when dropped.
pub struct TestTree {
    dir: TempDir,
    git_initialized: bool,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            dir,
            git_initialized: false,
        }
    }

    /// Create a new temporary directory with git initialized.
    pub fn with_git() -> Self {
        let mut tree = Self::new();
        tree.init_git();
        tree
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `file://` URL of this tree, for cloning it as a remote.
    pub fn file_url(&self) -> String {
        format!("file://{}", self.dir.path().display())
    }

    /// Initialize a git repository and configure a commit identity.
    pub fn init_git(&mut self) {
        for args in [
            &["init"][..],
            &["config", "user.email", "test@test.com"],
            &["config", "user.name", "Test"],
            &["config", "commit.gpgsign", "false"],
        ] {
            self.git(args);
        }
        self.git_initialized = true;
    }

    /// Write a text file, creating parent directories, and stage it if git is initialized.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        self.add_bytes(path, content.as_bytes())
    }

    /// Write raw bytes, creating parent directories, and stage it if git is initialized.
    pub fn add_bytes(&self, path: &str, content: &[u8]) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");

        if self.git_initialized {
            self.git(&["add", path]);
        }

        full_path
    }

    /// Create an empty directory.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Create a commit with the given message.
    pub fn commit(&self, message: &str) {
        assert!(self.git_initialized, "Git not initialized");
        self.git(&["commit", "-m", message, "--allow-empty"]);
    }

    fn git(&self, args: &[&str]) {
        Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to run git");
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
