use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

pub const OTHER_NODE_COLUMN: &str = "other_node";
pub const OTHER_NODE_TYPE_COLUMN: &str = "other_node_type";

/// One input record, keyed by column name.
pub type Row = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub primary: bool,
    pub degree: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug)]
pub struct GraphModel {
    pub primary_column: String,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    index_by_id: HashMap<String, usize>,
}

impl GraphModel {
    pub fn new(primary_column: String, nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        Self {
            primary_column,
            nodes,
            links,
            index_by_id,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    /// Distinct node types in order of first appearance, primary type first.
    pub fn node_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .map(|node| node.node_type.as_str())
            .filter(|node_type| seen.insert(*node_type))
            .collect()
    }

    pub fn has_type(&self, node_type: &str) -> bool {
        self.nodes.iter().any(|node| node.node_type == node_type)
    }

    pub fn has_name(&self, node_type: &str, name: &str) -> bool {
        self.nodes
            .iter()
            .any(|node| node.node_type == node_type && node.name == name)
    }

    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.node_type == node_type)
    }
}
