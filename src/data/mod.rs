mod build;
mod graph;
mod parse;
mod source;

pub use build::{build_graph, primary_column};
pub use graph::{GraphModel, Link, Node, OTHER_NODE_COLUMN, OTHER_NODE_TYPE_COLUMN, Row};
pub use parse::{normalize_rows, parse_csv};
pub use source::{FileSource, RawInputSource, TextSource, spawn_read};
