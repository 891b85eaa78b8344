//! Plain-text digest formatter
//!
//! A digest has three parts: a summary (printed to stderr by the CLI), the
//! directory tree, and the concatenated file contents. The latter two form the
//! written artifact.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::tree::{Digest, IngestionOptions, Node, NodeKind, format_size};

use super::config::OutputConfig;

/// Header line framing each file in the contents section.
pub const FILE_SEPARATOR: &str = "================================================";

/// Rendered sections of a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedDigest {
    pub summary: String,
    pub tree: String,
    pub contents: String,
}

impl FormattedDigest {
    /// The artifact written to the output file: tree, blank line, contents.
    pub fn document(&self) -> String {
        format!("{}\n{}", self.tree, self.contents)
    }
}

/// Formatter for the text digest.
pub struct DigestFormatter {
    config: OutputConfig,
}

impl DigestFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn format(&self, digest: &Digest, options: &IngestionOptions) -> FormattedDigest {
        let mut contents = String::new();
        gather_contents(&digest.root, &mut contents);

        FormattedDigest {
            summary: summary(digest, options, &contents),
            tree: tree_structure(&digest.root),
            contents,
        }
    }

    /// Print the summary block to stderr, with the labels highlighted.
    pub fn print_summary(&self, summary: &str) -> io::Result<()> {
        let choice = if self.config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stderr = StandardStream::stderr(choice);

        writeln!(stderr)?;
        stderr.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(stderr, "--- Summary ---")?;
        stderr.reset()?;

        for line in summary.lines() {
            match line.split_once(": ") {
                Some((label, value)) => {
                    stderr.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                    write!(stderr, "{label}:")?;
                    stderr.reset()?;
                    writeln!(stderr, " {value}")?;
                }
                None => writeln!(stderr, "{line}")?,
            }
        }
        Ok(())
    }
}

fn summary(digest: &Digest, options: &IngestionOptions, contents: &str) -> String {
    let mut lines = Vec::new();
    let root = &digest.root;

    if digest.is_single_file() {
        lines.push(format!("Source File: {}", options.source));
    } else {
        lines.push(format!("Source Directory: {}", options.source));
    }
    if let Some(remote) = &digest.remote {
        lines.push(format!("Repository: {}", remote.url));
        if let Some(branch) = &remote.branch {
            lines.push(format!("Branch: {branch}"));
        }
        if let Some(commit) = &remote.commit {
            lines.push(format!("Commit: {commit}"));
        }
    }
    if !options.include_patterns.is_empty() {
        lines.push(format!(
            "Include Patterns: {}",
            options.include_patterns.join(", ")
        ));
    }
    if !options.exclude_patterns.is_empty() {
        lines.push(format!(
            "Exclude Patterns: {}",
            options.exclude_patterns.join(", ")
        ));
    }
    if options.max_file_size > 0 {
        lines.push(format!("Max File Size: {}", format_size(options.max_file_size)));
    }

    match &root.kind {
        NodeKind::Directory { .. } => {
            lines.push(format!("Files analyzed: {}", digest.total_files));
            lines.push(format!("Total size: {}", format_size(digest.total_size)));
        }
        NodeKind::File { content } => {
            lines.push(format!("File: {}", root.name));
            lines.push(format!("Size: {}", format_size(root.size)));
            let text = content.as_deref().unwrap_or("");
            lines.push(format!("Lines: {}", text.matches('\n').count() + 1));
        }
        _ => {
            lines.push(format!("File: {} ({})", root.name, root.kind.label()));
        }
    }
    lines.push(format!("Estimated tokens: {}", estimate_tokens(contents)));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Rough placeholder: one token per four bytes.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

fn tree_structure(root: &Node) -> String {
    let mut out = String::new();
    if root.is_dir() {
        out.push_str("Directory structure:\n");
        write_tree_node(root, &mut out, "", true);
    } else {
        out.push_str("File processed:\n");
        out.push_str(&format!("└── {}\n", display_name(root)));
    }
    out
}

fn display_name(node: &Node) -> String {
    let mut name = node.name.clone();
    match &node.kind {
        NodeKind::Directory { .. } => name.push('/'),
        NodeKind::File { .. } => {}
        NodeKind::Symlink => name.push_str(" (symlink)"),
        NodeKind::NotText => name.push_str(" (non-text)"),
        NodeKind::TooLarge => name.push_str(&format!(" (too large: {})", format_size(node.size))),
        NodeKind::Excluded => name.push_str(" (excluded)"),
    }
    if let Some(error) = &node.error {
        name.push_str(&format!(" [error: {error}]"));
    }
    name
}

fn write_tree_node(node: &Node, out: &mut String, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };
    out.push_str(&format!("{prefix}{connector}{}\n", display_name(node)));

    let children = node.children();
    if children.is_empty() {
        return;
    }
    let child_prefix = if is_last {
        format!("{prefix}    ")
    } else {
        format!("{prefix}│   ")
    };
    for (i, child) in children.iter().enumerate() {
        write_tree_node(child, out, &child_prefix, i == children.len() - 1);
    }
}

fn gather_contents(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::File {
            content: Some(content),
        } if !content.is_empty() => {
            out.push_str(&format!(
                "{FILE_SEPARATOR}\nFile: {}\n{FILE_SEPARATOR}\n",
                node.path
            ));
            out.push_str(content);
            if !content.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        NodeKind::NotText | NodeKind::TooLarge => {
            out.push_str(&format!(
                "{FILE_SEPARATOR}\nFile: {} ({} - content not included)\n{FILE_SEPARATOR}\n\n\n",
                node.path,
                node.kind.label()
            ));
        }
        NodeKind::Directory { children } => {
            for child in children {
                gather_contents(child, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::{NodeError, NodeErrorKind};

    fn node(name: &str, path: &str, kind: NodeKind, size: u64) -> Node {
        Node {
            name: name.to_string(),
            path: path.to_string(),
            source_path: PathBuf::from(path),
            size,
            mode: 0o644,
            depth: path.matches('/').count() + 1,
            error: None,
            kind,
        }
    }

    fn sample() -> Digest {
        let main = node(
            "main.rs",
            "src/main.rs",
            NodeKind::File {
                content: Some("fn main() {}".to_string()),
            },
            12,
        );
        let src = node(
            "src",
            "src",
            NodeKind::Directory {
                children: vec![main],
            },
            12,
        );
        let logo = node("logo.png", "logo.png", NodeKind::NotText, 2048);
        let big = node("dump.sql", "dump.sql", NodeKind::TooLarge, 4096);
        let root = Node {
            depth: 0,
            ..node(
                "project",
                ".",
                NodeKind::Directory {
                    children: vec![src, big, logo],
                },
                12 + 2048 + 4096,
            )
        };
        Digest {
            root,
            total_files: 3,
            total_size: 12 + 2048 + 4096,
            remote: None,
        }
    }

    fn formatter() -> DigestFormatter {
        DigestFormatter::new(OutputConfig { use_color: false })
    }

    #[test]
    fn test_tree_structure() {
        let out = formatter().format(&sample(), &IngestionOptions::new("project"));
        let expected = "\
Directory structure:
└── project/
    ├── src/
    │   └── main.rs
    ├── dump.sql (too large: 4.0 KB)
    └── logo.png (non-text)
";
        assert_eq!(out.tree, expected);
    }

    #[test]
    fn test_contents_sections() {
        let out = formatter().format(&sample(), &IngestionOptions::new("project"));
        assert!(out.contents.starts_with(&format!(
            "{FILE_SEPARATOR}\nFile: src/main.rs\n{FILE_SEPARATOR}\nfn main() {{}}\n\n"
        )));
        assert!(out
            .contents
            .contains("File: dump.sql (too-large - content not included)"));
        assert!(out
            .contents
            .contains("File: logo.png (non-text - content not included)"));
    }

    #[test]
    fn test_directory_summary() {
        let options = IngestionOptions::new("project")
            .with_include_patterns(["*.rs"])
            .with_max_file_size(1024);
        let out = formatter().format(&sample(), &options);
        assert!(out.summary.starts_with("Source Directory: project\n"));
        assert!(out.summary.contains("Include Patterns: *.rs\n"));
        assert!(out.summary.contains("Exclude Patterns: .git/, .svn/"));
        assert!(out.summary.contains("Max File Size: 1.0 KB\n"));
        assert!(out.summary.contains("Files analyzed: 3\n"));
        assert!(out.summary.contains("Total size: 6.0 KB\n"));
        assert!(out.summary.contains("Estimated tokens: "));
    }

    #[test]
    fn test_single_file_summary_and_tree() {
        let root = Node {
            depth: 0,
            ..node(
                "notes.txt",
                "notes.txt",
                NodeKind::File {
                    content: Some("a\nb\nc".to_string()),
                },
                5,
            )
        };
        let digest = Digest {
            root,
            total_files: 1,
            total_size: 5,
            remote: None,
        };
        let out = formatter().format(&digest, &IngestionOptions::new("notes.txt"));
        assert!(out.summary.starts_with("Source File: notes.txt\n"));
        assert!(out.summary.contains("Lines: 3\n"));
        assert_eq!(out.tree, "File processed:\n└── notes.txt\n");
        assert!(out.contents.contains("File: notes.txt\n"));
    }

    #[test]
    fn test_excluded_root_prints_marker_and_stops() {
        let root = Node {
            depth: 0,
            ..node("Cargo.lock", "Cargo.lock", NodeKind::Excluded, 100)
        };
        let digest = Digest {
            root,
            total_files: 0,
            total_size: 0,
            remote: None,
        };
        let out = formatter().format(&digest, &IngestionOptions::new("Cargo.lock"));
        assert_eq!(out.tree, "File processed:\n└── Cargo.lock (excluded)\n");
        assert!(out.contents.is_empty());
        assert!(out.summary.contains("File: Cargo.lock (excluded)\n"));
    }

    #[test]
    fn test_node_errors_are_annotated() {
        let mut locked = node(
            "locked",
            "locked",
            NodeKind::Directory {
                children: Vec::new(),
            },
            0,
        );
        locked.error = Some(NodeError {
            kind: NodeErrorKind::ReadDir,
            message: "failed to read directory: denied".to_string(),
        });
        assert_eq!(
            display_name(&locked),
            "locked/ [error: failed to read directory: denied]"
        );
    }

    #[test]
    fn test_empty_files_have_no_section() {
        let empty = node(
            "empty.txt",
            "empty.txt",
            NodeKind::File {
                content: Some(String::new()),
            },
            0,
        );
        let mut out = String::new();
        gather_contents(&empty, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_document_joins_tree_and_contents() {
        let out = formatter().format(&sample(), &IngestionOptions::new("project"));
        assert_eq!(out.document(), format!("{}\n{}", out.tree, out.contents));
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
