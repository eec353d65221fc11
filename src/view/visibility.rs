use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::data::{Link, Node};

use super::adjacency::{ADJACENCY_PASSES, adjacent_nodes};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisibilityMode {
    /// Shown only when linked to a node that is already visible.
    #[default]
    Adjacent,
    All,
    None,
    /// Shown only when the node's name is in the type's selection.
    Selected,
}

impl VisibilityMode {
    pub const ALL: [Self; 4] = [Self::Adjacent, Self::All, Self::None, Self::Selected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adjacent => "adjacent",
            Self::All => "all",
            Self::None => "none",
            Self::Selected => "selected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeVisibility {
    pub mode: VisibilityMode,
    pub selected_names: BTreeSet<String>,
    pub show_labels: bool,
}

impl Default for TypeVisibility {
    fn default() -> Self {
        Self {
            mode: VisibilityMode::Adjacent,
            selected_names: BTreeSet::new(),
            show_labels: true,
        }
    }
}

/// Per-type visibility settings. Types without an entry use the defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityConfig {
    pub types: BTreeMap<String, TypeVisibility>,
}

impl VisibilityConfig {
    pub fn mode(&self, node_type: &str) -> VisibilityMode {
        self.types
            .get(node_type)
            .map(|visibility| visibility.mode)
            .unwrap_or_default()
    }

    pub fn show_labels(&self, node_type: &str) -> bool {
        self.types
            .get(node_type)
            .is_none_or(|visibility| visibility.show_labels)
    }

    pub fn is_selected(&self, node_type: &str, name: &str) -> bool {
        self.types
            .get(node_type)
            .is_some_and(|visibility| visibility.selected_names.contains(name))
    }

    pub fn entry(&mut self, node_type: &str) -> &mut TypeVisibility {
        self.types.entry(node_type.to_string()).or_default()
    }

    pub fn with_mode(mut self, node_type: &str, mode: VisibilityMode) -> Self {
        self.entry(node_type).mode = mode;
        self
    }

    pub fn with_selected<I, S>(mut self, node_type: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry(node_type)
            .selected_names
            .extend(names.into_iter().map(Into::into));
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveModel {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl LiveModel {
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }
}

fn directly_selected(node: &Node, config: &VisibilityConfig) -> bool {
    match config.mode(&node.node_type) {
        VisibilityMode::All => true,
        VisibilityMode::Selected => config.is_selected(&node.node_type, &node.name),
        VisibilityMode::Adjacent | VisibilityMode::None => false,
    }
}

/// Computes the live nodes and links for `config`.
///
/// Nodes of `all` types and selected nodes of `selected` types are shown
/// directly. `adjacent` types are then admitted when linked to a shown node,
/// repeated [`ADJACENCY_PASSES`] times. Links are live when both ends are.
pub fn compute_live(nodes: &[Node], links: &[Link], config: &VisibilityConfig) -> LiveModel {
    let mut visible = nodes
        .iter()
        .filter(|node| directly_selected(node, config))
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    for _ in 0..ADJACENCY_PASSES {
        let adjacent = adjacent_nodes(nodes, links, &visible, config);
        visible.extend(adjacent);
    }

    let live_nodes = nodes
        .iter()
        .filter(|node| visible.contains(node.id.as_str()))
        .cloned()
        .collect::<Vec<_>>();
    let live_links = links
        .iter()
        .filter(|link| {
            visible.contains(link.source.as_str()) && visible.contains(link.target.as_str())
        })
        .cloned()
        .collect::<Vec<_>>();

    LiveModel {
        nodes: live_nodes,
        links: live_links,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn node(node_type: &str, name: &str) -> Node {
        Node {
            id: format!("{node_type}: {name}"),
            name: name.to_string(),
            node_type: node_type.to_string(),
            primary: node_type == "Company",
            degree: 1,
        }
    }

    fn link(source: &str, target: &str) -> Link {
        Link {
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    fn ids(live: &LiveModel) -> Vec<&str> {
        live.nodes.iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn modes_parse_from_their_names() {
        for mode in VisibilityMode::ALL {
            assert_eq!(VisibilityMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(VisibilityMode::parse("everything"), None);
    }

    #[test]
    fn default_config_shows_nothing() {
        let nodes = vec![node("Company", "Acme"), node("Person", "Bob")];
        let links = vec![link("Company: Acme", "Person: Bob")];

        let live = compute_live(&nodes, &links, &VisibilityConfig::default());

        assert!(live.nodes.is_empty());
        assert!(live.links.is_empty());
    }

    #[test]
    fn selected_mode_shows_only_chosen_names() {
        let nodes = vec![node("Company", "Acme"), node("Company", "Globex")];
        let config = VisibilityConfig::default()
            .with_mode("Company", VisibilityMode::Selected)
            .with_selected("Company", ["Globex"]);

        let live = compute_live(&nodes, &[], &config);

        assert_eq!(ids(&live), vec!["Company: Globex"]);
    }

    #[test]
    fn adjacency_reaches_two_hops_and_no_further() {
        let nodes = vec![
            node("Company", "Acme"),
            node("Person", "Bob"),
            node("Project", "Apollo"),
            node("Site", "Leeds"),
        ];
        let links = vec![
            link("Company: Acme", "Person: Bob"),
            link("Person: Bob", "Project: Apollo"),
            link("Project: Apollo", "Site: Leeds"),
        ];
        let config = VisibilityConfig::default().with_mode("Company", VisibilityMode::All);

        let live = compute_live(&nodes, &links, &config);

        assert_eq!(
            ids(&live),
            vec!["Company: Acme", "Person: Bob", "Project: Apollo"]
        );
        assert_eq!(live.links.len(), 2);
    }

    #[test]
    fn adjacency_ignores_link_direction() {
        let nodes = vec![node("Company", "Acme"), node("Person", "Bob")];
        let links = vec![link("Company: Acme", "Person: Bob")];
        let config = VisibilityConfig::default().with_mode("Person", VisibilityMode::All);

        let live = compute_live(&nodes, &links, &config);

        assert_eq!(ids(&live), vec!["Company: Acme", "Person: Bob"]);
        assert_eq!(live.links, links);
    }

    #[test]
    fn none_mode_is_never_pulled_in() {
        let nodes = vec![node("Company", "Acme"), node("Person", "Bob")];
        let links = vec![link("Company: Acme", "Person: Bob")];
        let config = VisibilityConfig::default()
            .with_mode("Company", VisibilityMode::All)
            .with_mode("Person", VisibilityMode::None);

        let live = compute_live(&nodes, &links, &config);

        assert_eq!(ids(&live), vec!["Company: Acme"]);
        assert!(live.links.is_empty());
    }

    #[test]
    fn duplicate_links_are_all_kept() {
        let nodes = vec![node("Company", "Acme"), node("Person", "Bob")];
        let links = vec![
            link("Company: Acme", "Person: Bob"),
            link("Company: Acme", "Person: Bob"),
        ];
        let config = VisibilityConfig::default().with_mode("Company", VisibilityMode::All);

        let live = compute_live(&nodes, &links, &config);

        assert_eq!(live.nodes.len(), 2);
        assert_eq!(live.links.len(), 2);
    }

    #[test]
    fn labels_default_to_shown() {
        let mut config = VisibilityConfig::default();
        assert!(config.show_labels("Person"));
        config.entry("Person").show_labels = false;
        assert!(!config.show_labels("Person"));
    }
}
