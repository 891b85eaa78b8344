//! TreeWalker - builds the full classified tree in memory

use std::fs::{self, DirEntry, Metadata};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, NodeError, NodeErrorKind, Result};

use super::config::IngestionOptions;
use super::filter::{Decision, should_descend};
use super::node::{Digest, Node, NodeKind};
use super::sort::sort_nodes;
use super::utils::{is_text_file, join_relative, permission_bits, read_file_content};

/// Directories at this depth are recorded but not expanded.
pub const MAX_DEPTH: usize = 20;

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    files: usize,
    size: u64,
}

impl Totals {
    fn record(&mut self, size: u64) {
        self.files += 1;
        self.size += size;
    }
}

/// Depth-first walker that applies include/exclude rules and captures text content.
pub struct TreeWalker<'a> {
    options: &'a IngestionOptions,
}

impl<'a> TreeWalker<'a> {
    pub fn new(options: &'a IngestionOptions) -> Self {
        Self { options }
    }

    /// Walk `root`, which may be a directory or a single file.
    ///
    /// Only a missing or unreadable root is an error; everything below the root
    /// is recorded on the affected node instead.
    pub fn walk(&self, root: &Path) -> Result<Digest> {
        let root = std::path::absolute(root).map_err(|e| IngestError::io(root, e))?;
        let metadata = fs::metadata(&root).map_err(|e| IngestError::io(&root, e))?;
        let name = root
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let mut totals = Totals::default();
        let node = if metadata.is_dir() {
            self.walk_dir(name, ".".to_string(), root, &metadata, 0, &mut totals)
        } else if metadata.is_file() {
            self.walk_root_file(name, root, &metadata, &mut totals)
        } else {
            return Err(IngestError::Io {
                path: root,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file or directory",
                ),
            });
        };

        Ok(Digest {
            root: node,
            total_files: totals.files,
            total_size: totals.size,
            remote: None,
        })
    }

    fn walk_root_file(
        &self,
        name: String,
        path: PathBuf,
        metadata: &Metadata,
        totals: &mut Totals,
    ) -> Node {
        let size = metadata.len();
        let decision = Decision::evaluate(&name, false, self.options);
        let (kind, error) = if decision.process() {
            totals.record(size);
            self.classify_file(&path, size)
        } else {
            tracing::debug!(path = %path.display(), "Root file excluded by patterns");
            (NodeKind::Excluded, None)
        };

        Node {
            path: name.clone(),
            name,
            source_path: path,
            size,
            mode: permission_bits(metadata),
            depth: 0,
            error,
            kind,
        }
    }

    fn walk_dir(
        &self,
        name: String,
        relative: String,
        path: PathBuf,
        metadata: &Metadata,
        depth: usize,
        totals: &mut Totals,
    ) -> Node {
        let mut node = Node {
            name,
            path: relative,
            source_path: path,
            size: 0,
            mode: permission_bits(metadata),
            depth,
            error: None,
            kind: NodeKind::Directory {
                children: Vec::new(),
            },
        };

        if depth >= MAX_DEPTH {
            tracing::warn!(
                path = %node.source_path.display(),
                max_depth = MAX_DEPTH,
                "Maximum directory depth reached, not descending further"
            );
            return node;
        }

        let entries = match fs::read_dir(&node.source_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, path = %node.source_path.display(), "Failed to read directory");
                node.error = Some(NodeError::new(NodeErrorKind::ReadDir, &e));
                return node;
            }
        };

        let mut children = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    if let Some(child) = self.visit_entry(&entry, &node.path, depth + 1, totals) {
                        children.push(child);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, path = %node.source_path.display(), "Failed to read directory entry");
                }
            }
        }

        sort_nodes(&mut children);
        node.size = children.iter().map(|child| child.size).sum();
        node.kind = NodeKind::Directory { children };
        node
    }

    /// Classify one directory entry. `None` means the entry is filtered out of the tree.
    fn visit_entry(
        &self,
        entry: &DirEntry,
        parent_relative: &str,
        depth: usize,
        totals: &mut Totals,
    ) -> Option<Node> {
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = join_relative(parent_relative, &name);
        let path = entry.path();

        // DirEntry::metadata does not follow symlinks
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Could not get file info");
                return Some(Node {
                    name,
                    path: relative,
                    source_path: path,
                    size: 0,
                    mode: 0,
                    depth,
                    error: Some(NodeError::new(NodeErrorKind::Metadata, &e)),
                    kind: NodeKind::File { content: None },
                });
            }
        };

        let file_type = metadata.file_type();
        let decision = Decision::evaluate(&relative, file_type.is_dir(), self.options);

        if file_type.is_dir() {
            if decision.prunes_directory() {
                tracing::debug!(path = %relative, "Directory excluded");
                return None;
            }
            if decision.has_includes
                && !decision.matches_include
                && !should_descend(&relative, &self.options.include_patterns)
            {
                tracing::debug!(path = %relative, "Directory cannot contain included paths");
                return None;
            }
            return Some(self.walk_dir(name, relative, path, &metadata, depth, totals));
        }

        if !decision.process() {
            tracing::debug!(path = %relative, "Entry excluded");
            return None;
        }

        let kind_and_error = if file_type.is_symlink() {
            (NodeKind::Symlink, None)
        } else if file_type.is_file() {
            totals.record(metadata.len());
            self.classify_file(&path, metadata.len())
        } else {
            tracing::debug!(path = %relative, "Skipping special file");
            return None;
        };
        let (kind, error) = kind_and_error;

        Some(Node {
            name,
            path: relative,
            source_path: path,
            size: metadata.len(),
            mode: permission_bits(&metadata),
            depth,
            error,
            kind,
        })
    }

    /// Size ceiling first, then text sniffing, then the full read.
    fn classify_file(&self, path: &Path, size: u64) -> (NodeKind, Option<NodeError>) {
        let max = self.options.max_file_size;
        if max > 0 && size > max {
            return (NodeKind::TooLarge, None);
        }

        match is_text_file(path) {
            Err(e) => (
                NodeKind::NotText,
                Some(NodeError::new(NodeErrorKind::TextDetection, &e)),
            ),
            Ok(false) => (NodeKind::NotText, None),
            Ok(true) => match read_file_content(path) {
                Ok(content) => (
                    NodeKind::File {
                        content: Some(content),
                    },
                    None,
                ),
                Err(e) => (
                    NodeKind::File { content: None },
                    Some(NodeError::new(NodeErrorKind::ReadContent, &e)),
                ),
            },
        }
    }
}
