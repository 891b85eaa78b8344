//! Output configuration types

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Highlight summary labels on stderr
    pub use_color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_color: true }
    }
}
