//! Shared utility functions for tree walking

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use glob::{MatchOptions, Pattern};

/// Number of leading bytes inspected by `is_text_file`.
pub const TEXT_DETECTION_WINDOW: u64 = 1024;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Match a shell glob against a name or slash-separated path.
/// `*` and `?` never match `/`, `**` is just `*`, and invalid patterns match nothing.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    Pattern::new(&single_segment_glob(pattern))
        .map(|p| p.matches_with(name, GLOB_OPTIONS))
        .unwrap_or(false)
}

/// Rewrite shell glob syntax into the `glob` crate's dialect: runs of `*`
/// collapse to one `*` (no recursive wildcard) and `[^...]` becomes `[!...]`.
fn single_segment_glob(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains("**") && !pattern.contains("[^") {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '*' if !in_class => {
                out.push('*');
                while chars.next_if_eq(&'*').is_some() {}
            }
            '[' if !in_class => {
                in_class = true;
                out.push('[');
                if chars
                    .next_if(|&next| next == '^' || next == '!')
                    .is_some()
                {
                    out.push('!');
                }
                // A `]` right after the opener is a literal member
                if chars.next_if_eq(&']').is_some() {
                    out.push(']');
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Sniff the first bytes of a file. A zero byte means binary; empty files are text.
pub fn is_text_file(path: &Path) -> io::Result<bool> {
    let mut head = Vec::with_capacity(TEXT_DETECTION_WINDOW as usize);
    File::open(path)?
        .take(TEXT_DETECTION_WINDOW)
        .read_to_end(&mut head)?;
    Ok(!head.contains(&0))
}

/// Read a whole file, replacing invalid UTF-8 sequences.
pub fn read_file_content(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Permission bits of an entry, or 0 where the platform has none.
pub fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode()
    }
    #[cfg(not(unix))]
    {
        if metadata.permissions().readonly() {
            0o444
        } else {
            0o644
        }
    }
}

/// Format a size in bytes to human-readable format.
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const SUFFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, SUFFIXES[exp])
}

/// Join a relative parent and a child name with `/`.
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == "." {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}
