pub fn node_id(node_type: &str, name: &str) -> String {
    format!("{node_type}: {name}")
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn node_radius(degree: usize) -> f64 {
    5.0 * (degree as f64).cbrt()
}
