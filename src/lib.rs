//! Graph model and visibility engine for node-link data supplied as sparse CSV.
//!
//! Raw CSV text is normalised and turned into a deduplicated [`GraphModel`];
//! a [`VisibilityConfig`] then selects the live subset handed to a renderer.

pub mod data;
mod error;
pub mod util;
pub mod view;

pub use data::{GraphModel, Link, Node, build_graph, normalize_rows, parse_csv};
pub use error::{GraphError, Result};
pub use view::{
    LiveModel, Session, TypeVisibility, VisibilityConfig, VisibilityMode, assign_colors,
    compute_live, wrap_label,
};
