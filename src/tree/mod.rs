//! Directory tree walking logic
//!
//! `TreeWalker` builds the full classified tree in memory. Filtering is driven
//! by `IngestionOptions` through the matcher in `filter`, and every directory's
//! children are ordered by `sort_nodes` once they have all been collected.

mod config;
mod defaults;
mod filter;
mod node;
mod sort;
mod utils;
mod walker;

// Re-export public types
pub use config::{DEFAULT_MAX_FILE_SIZE, IngestionOptions};
pub use defaults::DEFAULT_EXCLUDE_PATTERNS;
pub use filter::{Decision, matches, should_descend};
pub use node::{Digest, Node, NodeIter, NodeKind};
pub use sort::sort_nodes;
pub use utils::{format_size, glob_match, is_text_file};
pub use walker::{MAX_DEPTH, TreeWalker};
