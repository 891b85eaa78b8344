//! Configuration types for ingestion

use super::defaults::DEFAULT_EXCLUDE_PATTERNS;

/// Default content ceiling used by the CLI (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Configuration for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionOptions {
    /// Local path, Git URL, SSH spec or `user/repo` slug.
    pub source: String,
    /// Files larger than this are recorded as too large. 0 disables the ceiling.
    pub max_file_size: u64,
    pub exclude_patterns: Vec<String>,
    /// Empty means "everything not excluded".
    pub include_patterns: Vec<String>,
    /// Only consulted when the source is remote.
    pub branch: Option<String>,
}

impl IngestionOptions {
    /// Options for `source` with the default exclude list and no size ceiling.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            max_file_size: 0,
            exclude_patterns: merge_patterns(
                DEFAULT_EXCLUDE_PATTERNS.iter().copied(),
                [] as [&str; 0],
            ),
            include_patterns: Vec::new(),
            branch: None,
        }
    }

    /// Add user exclude patterns on top of the ones already configured.
    pub fn with_exclude_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let current = std::mem::take(&mut self.exclude_patterns);
        self.exclude_patterns = merge_patterns(current, patterns);
        self
    }

    pub fn with_include_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let current = std::mem::take(&mut self.include_patterns);
        self.include_patterns = merge_patterns(current, patterns);
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        self.branch = (!branch.is_empty()).then_some(branch);
        self
    }

    /// Copy of these options pointing at a different source.
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..self.clone()
        }
    }

    pub fn has_includes(&self) -> bool {
        !self.include_patterns.is_empty()
    }
}

/// Concatenate two pattern lists, keeping first occurrences and dropping blanks.
fn merge_patterns<A, B, SA, SB>(base: A, extra: B) -> Vec<String>
where
    A: IntoIterator<Item = SA>,
    B: IntoIterator<Item = SB>,
    SA: Into<String>,
    SB: Into<String>,
{
    let mut merged: Vec<String> = Vec::new();
    let candidates = base
        .into_iter()
        .map(Into::into)
        .chain(extra.into_iter().map(Into::into));
    for pattern in candidates {
        let pattern = pattern.trim().to_string();
        if !pattern.is_empty() && !merged.contains(&pattern) {
            merged.push(pattern);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seeds_default_excludes() {
        let opts = IngestionOptions::new(".");
        assert_eq!(opts.exclude_patterns.len(), DEFAULT_EXCLUDE_PATTERNS.len());
        assert!(opts.exclude_patterns.iter().any(|p| p == "node_modules/"));
        assert!(opts.include_patterns.is_empty());
        assert_eq!(opts.max_file_size, 0);
        assert!(opts.branch.is_none());
    }

    #[test]
    fn test_user_excludes_are_appended_and_deduplicated() {
        let opts = IngestionOptions::new(".").with_exclude_patterns(["*.md", ".git/", "*.md"]);
        assert_eq!(
            opts.exclude_patterns.len(),
            DEFAULT_EXCLUDE_PATTERNS.len() + 1
        );
        assert_eq!(opts.exclude_patterns.last().map(String::as_str), Some("*.md"));
    }

    #[test]
    fn test_blank_patterns_are_dropped() {
        let opts = IngestionOptions::new(".").with_include_patterns(["", "  ", "*.rs"]);
        assert_eq!(opts.include_patterns, vec!["*.rs".to_string()]);
        assert!(opts.has_includes());
    }

    #[test]
    fn test_empty_branch_is_none() {
        assert!(IngestionOptions::new(".").with_branch("").branch.is_none());
        assert_eq!(
            IngestionOptions::new(".").with_branch("dev").branch.as_deref(),
            Some("dev")
        );
    }

    #[test]
    fn test_with_source_keeps_patterns() {
        let opts = IngestionOptions::new("a").with_include_patterns(["*.go"]);
        let moved = opts.with_source("b");
        assert_eq!(moved.source, "b");
        assert_eq!(moved.include_patterns, opts.include_patterns);
    }
}
