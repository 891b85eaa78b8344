//! Digest formatting and display
//!
//! - `config` - Output configuration types
//! - `digest` - Plain-text summary, tree and contents sections
//! - `json` - JSON output

mod config;
mod digest;
mod json;

// Re-export public types and functions
pub use config::OutputConfig;
pub use digest::{DigestFormatter, FILE_SEPARATOR, FormattedDigest, estimate_tokens};
pub use json::to_json;
