use std::collections::HashMap;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::data::Node;

pub const SELECTION_LIST_MAX_ROWS: usize = 10;

/// Node names grouped by type, for building per-type selection lists.
///
/// Types keep their first-appearance order; names are sorted ignoring case.
pub fn names_by_type(nodes: &[Node]) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    let mut index_by_type = HashMap::new();

    for node in nodes {
        let index = *index_by_type
            .entry(node.node_type.as_str())
            .or_insert_with(|| {
                groups.push((node.node_type.clone(), Vec::new()));
                groups.len() - 1
            });
        groups[index].1.push(node.name.clone());
    }

    for (_, names) in &mut groups {
        names.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
    }

    groups
}

pub fn selection_list_rows(name_count: usize) -> usize {
    name_count.min(SELECTION_LIST_MAX_ROWS)
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

pub fn search_names<'a>(names: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return names.iter().map(String::as_str).collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = names
        .iter()
        .filter_map(|name| fuzzy_match_score(&matcher, name, query).map(|score| (score, name)))
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored.into_iter().map(|(_, name)| name.as_str()).collect()
}
