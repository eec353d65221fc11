use std::collections::HashMap;

use crate::error::{GraphError, Result};
use crate::util::node_id;

use super::graph::{GraphModel, Link, Node, OTHER_NODE_COLUMN, OTHER_NODE_TYPE_COLUMN, Row};

/// Resolves the primary column from the first row's columns.
///
/// The primary column is the only column besides `other_node` and
/// `other_node_type`; its header doubles as the primary nodes' type.
pub fn primary_column(rows: &[Row]) -> Result<String> {
    let first = rows
        .first()
        .ok_or_else(|| GraphError::malformed("input has no data rows"))?;

    for required in [OTHER_NODE_COLUMN, OTHER_NODE_TYPE_COLUMN] {
        if !first.contains_key(required) {
            return Err(GraphError::malformed(format!(
                "header row has no `{required}` column"
            )));
        }
    }

    let mut candidates = first
        .keys()
        .filter(|column| !matches!(column.as_str(), OTHER_NODE_COLUMN | OTHER_NODE_TYPE_COLUMN));

    match (candidates.next(), candidates.next()) {
        (Some(column), None) => Ok(column.clone()),
        (None, _) => Err(GraphError::malformed(
            "header row has no primary node column",
        )),
        (Some(first_column), Some(second_column)) => Err(GraphError::malformed(format!(
            "header row has more than one primary node column candidate (`{first_column}`, `{second_column}`)"
        ))),
    }
}

pub fn build_graph(rows: &[Row]) -> Result<GraphModel> {
    let primary = primary_column(rows)?;

    let mut primary_nodes = NodeTally::default();
    let mut other_nodes = NodeTally::default();
    let mut links = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let primary_name = cell(row, &primary, index)?;
        let other_name = cell(row, OTHER_NODE_COLUMN, index)?;
        let other_type = cell(row, OTHER_NODE_TYPE_COLUMN, index)?;

        if other_type == primary {
            return Err(GraphError::malformed(format!(
                "row {} uses the primary column name `{primary}` as an other_node_type",
                index + 1
            )));
        }

        let source = primary_nodes.count(&primary, primary_name, true);
        let target = other_nodes.count(other_type, other_name, false);
        links.push(Link { source, target });
    }

    let mut nodes = primary_nodes.nodes;
    nodes.extend(other_nodes.nodes);

    tracing::debug!(
        primary_column = %primary,
        nodes = nodes.len(),
        links = links.len(),
        "built graph model"
    );

    Ok(GraphModel::new(primary, nodes, links))
}

#[derive(Default)]
struct NodeTally {
    nodes: Vec<Node>,
    index_by_id: HashMap<String, usize>,
}

impl NodeTally {
    fn count(&mut self, node_type: &str, name: &str, primary: bool) -> String {
        let id = node_id(node_type, name);
        if let Some(&index) = self.index_by_id.get(&id) {
            self.nodes[index].degree += 1;
        } else {
            self.index_by_id.insert(id.clone(), self.nodes.len());
            self.nodes.push(Node {
                id: id.clone(),
                name: name.to_string(),
                node_type: node_type.to_string(),
                primary,
                degree: 1,
            });
        }
        id
    }
}

fn cell<'a>(row: &'a Row, column: &str, index: usize) -> Result<&'a str> {
    row.get(column).map(String::as_str).ok_or_else(|| {
        GraphError::malformed(format!("row {} has no `{column}` value", index + 1))
    })
}
