//! Result tree types
//!
//! `Node` holds what every entry has in common; `NodeKind` carries what only
//! some kinds have, so a directory can never hold content and a file can never
//! hold children.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::NodeError;
use crate::git::RemoteSource;

/// One filesystem entry in the result tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Base name. Remote roots are renamed to `user/repo[/subpath]`.
    pub name: String,
    /// Slash-separated path relative to the walk root (`.` for a directory root).
    pub path: String,
    /// Location on disk.
    pub source_path: PathBuf,
    pub size: u64,
    pub mode: u32,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<NodeError>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// How an entry was treated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    Directory {
        children: Vec<Node>,
    },
    File {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    Symlink,
    #[serde(rename = "non-text")]
    NotText,
    TooLarge,
    Excluded,
}

impl NodeKind {
    /// Short label used in rendered output.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Directory { .. } => "directory",
            NodeKind::File { .. } => "file",
            NodeKind::Symlink => "symlink",
            NodeKind::NotText => "non-text",
            NodeKind::TooLarge => "too-large",
            NodeKind::Excluded => "excluded",
        }
    }
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Directory { children } => children,
            _ => &[],
        }
    }

    /// Captured text. `None` for every kind except a successfully read file.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => content.as_deref(),
            _ => None,
        }
    }

    /// Whether this node contributes to the file count and total size.
    pub fn is_counted(&self) -> bool {
        match self.kind {
            NodeKind::NotText | NodeKind::TooLarge => true,
            NodeKind::File { .. } => self.error.as_ref().is_none_or(|e| {
                e.kind != crate::error::NodeErrorKind::Metadata
            }),
            _ => false,
        }
    }

    /// Depth-first pre-order iterator over this node and its descendants.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }
}

pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// The outcome of one ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub root: Node,
    pub total_files: usize,
    pub total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSource>,
}

impl Digest {
    pub fn is_single_file(&self) -> bool {
        !self.root.is_dir()
    }
}
