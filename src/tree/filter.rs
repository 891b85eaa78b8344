//! Include/exclude pattern matching
//!
//! Patterns come in two flavours:
//!
//! - Directory patterns end in `/` (`node_modules/`, `src/api/`). They match by
//!   path prefix so whole subtrees can be pruned without visiting them.
//! - Name patterns are shell globs (`*.lock`, `src/*.go`) tried against both
//!   the base name and the full relative path.

use super::config::IngestionOptions;
use super::utils::glob_match;

/// Check whether `relative_path` matches any of `patterns`.
pub fn matches<S: AsRef<str>>(relative_path: &str, is_dir: bool, patterns: &[S]) -> bool {
    let path = normalize_candidate(relative_path);
    let path = path.as_str();

    patterns.iter().any(|pattern| {
        let pattern = pattern.as_ref();
        match directory_pattern(pattern) {
            Some("") => is_root(path),
            Some(dir) if is_dir => !is_root(path) && related_by_prefix(path, dir),
            Some(dir) => {
                let parent = parent_dir(path);
                format!("{parent}/").starts_with(&format!("{dir}/"))
            }
            None => {
                let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
                !pattern.is_empty()
                    && !is_root(path)
                    && (glob_match(pattern, base_name(path)) || glob_match(pattern, path))
            }
        }
    })
}

/// Decide whether a directory that did not match an include pattern itself may
/// still contain something that does.
pub fn should_descend<S: AsRef<str>>(relative_dir: &str, include_patterns: &[S]) -> bool {
    let path = normalize_candidate(relative_dir);
    let path = path.as_str();

    include_patterns
        .iter()
        .any(|pattern| match directory_pattern(pattern.as_ref()) {
            Some(dir) => related_by_prefix(path, dir),
            None => true,
        })
}

/// Outcome of the include/exclude decision table for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub matches_exclude: bool,
    pub matches_include: bool,
    pub has_includes: bool,
}

impl Decision {
    pub fn evaluate(relative_path: &str, is_dir: bool, options: &IngestionOptions) -> Self {
        let has_includes = options.has_includes();
        Self {
            matches_exclude: matches(relative_path, is_dir, &options.exclude_patterns),
            matches_include: has_includes
                && matches(relative_path, is_dir, &options.include_patterns),
            has_includes,
        }
    }

    /// Whether the entry itself is processed. Includes override excludes.
    pub fn process(&self) -> bool {
        if self.has_includes {
            self.matches_include
        } else {
            !self.matches_exclude
        }
    }

    /// Whether an excluded directory is cut off before any probing.
    pub fn prunes_directory(&self) -> bool {
        self.matches_exclude && !self.matches_include
    }
}

/// Force `/` separators and strip a leading `./` and trailing slashes.
fn normalize_candidate(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.strip_prefix("./").unwrap_or(&path);
    path.trim_end_matches('/').to_string()
}

fn is_root(path: &str) -> bool {
    path.is_empty() || path == "."
}

/// Strip the directory marker from a pattern; `None` for name patterns.
fn directory_pattern(pattern: &str) -> Option<&str> {
    let stripped = pattern.strip_suffix('/')?;
    let stripped = stripped.strip_prefix("./").unwrap_or(stripped);
    Some(if stripped == "." { "" } else { stripped })
}

/// Candidate is the pattern directory, one of its ancestors, or a descendant.
fn related_by_prefix(path: &str, dir: &str) -> bool {
    let path = format!("{path}/");
    let dir = format!("{dir}/");
    path.starts_with(&dir) || dir.starts_with(&path)
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

fn base_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(path: &str, is_dir: bool, patterns: &[&str]) -> bool {
        matches(path, is_dir, patterns)
    }

    #[test]
    fn test_name_patterns() {
        assert!(check("file.txt", false, &["file.txt"]));
        assert!(!check("other.txt", false, &["file.txt"]));
        assert!(check("doc.txt", false, &["*.txt"]));
        assert!(!check("doc.md", false, &["*.txt"]));
        assert!(check("main.go", false, &["main.*"]));
        assert!(check("image.jpg", false, &["*.png", "*.jpg", "*.gif"]));
        assert!(!check("image.bmp", false, &["*.png", "*.jpg", "*.gif"]));
        assert!(check("src/config.json", false, &["config.json"]));
    }

    #[test]
    fn test_full_path_globs() {
        assert!(check("src/file.go", false, &["src/*.go"]));
        assert!(!check("lib/file.go", false, &["src/*.go"]));
        // `*` never crosses a separator
        assert!(!check("src/deep/file.go", false, &["src/*.go"]));
    }

    #[test]
    fn test_directory_patterns_against_directories() {
        assert!(check("src", true, &["src/"]));
        assert!(check("src/", true, &["src/"]));
        assert!(!check("docs", true, &["src/"]));
        assert!(check("vendor/lib/sublib", true, &["vendor/"]));
        assert!(check("build", true, &["build/"]));
        // ancestors of a nested directory pattern match too
        assert!(check("a", true, &["a/b/"]));
        assert!(check("a/b", true, &["a/b/"]));
        assert!(check("a/b/c", true, &["a/b/"]));
        assert!(!check("a/bc", true, &["a/b/"]));
        assert!(!check("ab", true, &["a/b/"]));
    }

    #[test]
    fn test_directory_patterns_against_files() {
        assert!(check("node_modules/package/file.js", false, &["node_modules/"]));
        assert!(!check("main.go", false, &["src/"]));
        assert!(check("a/b/c/d.txt", false, &["a/b/"]));
        assert!(!check("a/other.txt", false, &["a/b/"]));
        assert!(check("dist/bundle.js", false, &["dist/"]));
        // a file named like a directory pattern is not inside it
        assert!(!check("data", false, &["data/"]));
    }

    #[test]
    fn test_dot_slash_prefixes() {
        assert!(check("./file.txt", false, &["*.txt"]));
        assert!(check("./src/file.go", false, &["src/*.go"]));
        assert!(check("./src/", true, &["src/"]));
        assert!(check("src", true, &["./src/"]));
    }

    #[test]
    fn test_ambiguous_file_or_dir_names() {
        assert!(check("config", false, &["config"]));
        assert!(check("config", true, &["config"]));
        assert!(check("data/", true, &["data"]));
    }

    #[test]
    fn test_backslash_separators() {
        assert!(check("src\\file.go", false, &["src/*.go"]));
        assert!(check("node_modules\\pkg", true, &["node_modules/"]));
    }

    #[test]
    fn test_root_directory_pattern() {
        assert!(check("", true, &["/"]));
        assert!(check(".", true, &["./"]));
        assert!(!check("src", true, &["/"]));
        assert!(!check("file.txt", false, &["./"]));
    }

    #[test]
    fn test_empty_inputs() {
        let none: [&str; 0] = [];
        assert!(!check("file.txt", false, &none));
        assert!(!check("", false, &none));
        assert!(!check("", false, &["*.txt"]));
        assert!(!check("", false, &["*"]));
    }

    #[test]
    fn test_invalid_glob_never_matches() {
        assert!(!check("a[b", false, &["a[b"]));
        assert!(!check("file.txt", false, &["[*.txt"]));
    }

    #[test]
    fn test_double_star_does_not_recurse() {
        assert!(!check("src/a/b/c.go", false, &["src/**/*.go"]));
        assert!(check("src/a/c.go", false, &["src/**/*.go"]));
        assert!(!check("src/x/main.go", false, &["**/*.go"]));
        assert!(check("main.go", false, &["**.go"]));
        assert!(check("src/x/main.go", false, &["**.go"]));
    }

    #[test]
    fn test_negated_character_class() {
        assert!(check("b.txt", false, &["[^a].txt"]));
        assert!(!check("a.txt", false, &["[^a].txt"]));
        assert!(check("docs/b.txt", false, &["[!a].txt"]));
    }

    #[test]
    fn test_should_descend_with_directory_patterns() {
        assert!(should_descend("src", &["src/api/"]));
        assert!(should_descend("src/api", &["src/api/"]));
        assert!(should_descend("src/api/v1", &["src/api/"]));
        assert!(!should_descend("docs", &["src/api/"]));
        assert!(!should_descend("src/apix", &["src/api/"]));
    }

    #[test]
    fn test_should_descend_with_glob_always_true() {
        assert!(should_descend("anything/at/all", &["*.go"]));
        assert!(should_descend("docs", &["src/api/", "*.md"]));
        let none: [&str; 0] = [];
        assert!(!should_descend("docs", &none));
    }

    fn decision(exclude: bool, has_includes: bool, include: bool) -> Decision {
        Decision {
            matches_exclude: exclude,
            matches_include: include,
            has_includes,
        }
    }

    #[test]
    fn test_decision_table() {
        assert!(decision(false, false, false).process());
        assert!(decision(false, true, true).process());
        assert!(!decision(false, true, false).process());
        assert!(!decision(true, false, false).process());
        assert!(decision(true, true, true).process());
        assert!(!decision(true, true, false).process());
    }

    #[test]
    fn test_include_overrides_exclude() {
        let options = IngestionOptions::new(".")
            .with_exclude_patterns(["*.md"])
            .with_include_patterns(["README.md"]);
        let readme = Decision::evaluate("README.md", false, &options);
        assert!(readme.matches_exclude);
        assert!(readme.process());

        let other = Decision::evaluate("CHANGES.md", false, &options);
        assert!(!other.process());
    }

    #[test]
    fn test_excluded_directory_is_pruned_unless_included() {
        let options = IngestionOptions::new(".");
        assert!(Decision::evaluate("node_modules", true, &options).prunes_directory());

        let options = options.with_include_patterns(["node_modules/"]);
        assert!(!Decision::evaluate("node_modules", true, &options).prunes_directory());
    }
}
