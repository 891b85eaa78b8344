//! JSON output formatting

use crate::tree::Digest;

/// Serialize a digest as pretty-printed JSON, with a trailing newline.
pub fn to_json(digest: &Digest) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(digest)?;
    json.push('\n');
    Ok(json)
}
