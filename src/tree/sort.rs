//! Sibling ordering

use std::cmp::Ordering;

use super::node::Node;

/// Directories first, then case-insensitive name order. Stable, so names that
/// differ only in case keep their discovery order.
pub fn sort_nodes(nodes: &mut [Node]) {
    nodes.sort_by(compare_nodes);
}

fn compare_nodes(a: &Node, b: &Node) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}
