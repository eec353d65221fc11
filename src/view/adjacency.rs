use std::collections::HashSet;

use crate::data::{Link, Node};

use super::visibility::{VisibilityConfig, VisibilityMode};

/// Number of times adjacency is expanded from the directly shown nodes.
pub const ADJACENCY_PASSES: usize = 2;

pub fn adjacent_nodes<'a>(
    nodes: &'a [Node],
    links: &[Link],
    reference: &HashSet<&str>,
    config: &VisibilityConfig,
) -> HashSet<&'a str> {
    let mut neighbours = HashSet::new();
    for link in links {
        if reference.contains(link.source.as_str()) {
            neighbours.insert(link.target.as_str());
        }
        if reference.contains(link.target.as_str()) {
            neighbours.insert(link.source.as_str());
        }
    }

    nodes
        .iter()
        .filter(|node| {
            config.mode(&node.node_type) == VisibilityMode::Adjacent
                && neighbours.contains(node.id.as_str())
        })
        .map(|node| node.id.as_str())
        .collect()
}
