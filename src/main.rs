use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use graph_visualisation::data::FileSource;
use graph_visualisation::util::node_radius;
use graph_visualisation::view::{JsonFileStore, Rgb, search_names, selection_list_rows};
use graph_visualisation::Session;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Summary,
    Json,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// CSV file with one primary column plus `other_node` and `other_node_type`.
    #[arg(long)]
    data: Option<PathBuf>,
    /// JSON file holding saved settings and the last uploaded data.
    #[arg(long, default_value = "graph-visualisation.json")]
    store: PathBuf,
    /// Visibility mode for a node type, as TYPE=MODE.
    #[arg(long = "mode", value_parser = parse_assignment)]
    modes: Vec<(String, String)>,
    /// Node to show for a type in `selected` mode, as TYPE=NAME.
    #[arg(long = "select", value_parser = parse_assignment)]
    selections: Vec<(String, String)>,
    /// Node type whose labels should be hidden.
    #[arg(long = "hide-labels")]
    hide_labels: Vec<String>,
    /// List the names of a type matching a query, as TYPE=QUERY.
    #[arg(long, value_parser = parse_assignment)]
    search: Option<(String, String)>,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    #[arg(long, default_value = "warn")]
    log: String,
}

fn parse_assignment(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected TYPE=VALUE, got `{value}`"))
}

#[derive(Serialize)]
struct RenderedNode<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    node_type: &'a str,
    primary: bool,
    degree: usize,
    radius: f64,
    color: Option<Rgb>,
    label_lines: Option<Vec<String>>,
}

#[derive(Serialize)]
struct Rendered<'a> {
    primary_column: &'a str,
    nodes: Vec<RenderedNode<'a>>,
    links: &'a [graph_visualisation::Link],
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log);

    let mut session = Session::new(Box::new(JsonFileStore::open(&args.store)));

    if let Some(path) = &args.data {
        session
            .upload_from(&FileSource::new(path))
            .with_context(|| format!("failed to load graph data from {}", path.display()))?;
    } else if !session
        .load_from_store()
        .context("failed to load remembered graph data")?
    {
        bail!(
            "no graph data: pass --data, or upload once so {} remembers it",
            args.store.display()
        );
    }

    for (node_type, mode) in &args.modes {
        session.set_mode(node_type, mode);
    }

    let mut selections: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (node_type, name) in &args.selections {
        selections
            .entry(node_type.as_str())
            .or_default()
            .push(name.as_str());
    }
    for (node_type, names) in selections {
        session.set_selected(node_type, names);
    }

    for node_type in &args.hide_labels {
        session.set_show_labels(node_type, false);
    }

    if let Some((node_type, query)) = &args.search {
        print_search(&session, node_type, query)?;
        return Ok(());
    }

    match args.format {
        OutputFormat::Summary => print_summary(&session),
        OutputFormat::Json => print_json(&session)?,
    }

    Ok(())
}

fn print_search(session: &Session, node_type: &str, query: &str) -> Result<()> {
    let groups = session.names_by_type();
    let Some((_, names)) = groups.iter().find(|(candidate, _)| candidate == node_type) else {
        bail!("no nodes of type `{node_type}`");
    };

    let matches = search_names(names, query);
    println!(
        "{} of {} {node_type} names match (list shows {} rows)",
        matches.len(),
        names.len(),
        selection_list_rows(names.len())
    );
    for name in matches {
        println!("  {name}");
    }
    Ok(())
}

fn print_summary(session: &Session) {
    let Some(model) = session.model() else {
        return;
    };

    println!(
        "{}: {} nodes, {} links ({} nodes, {} links visible)",
        model.primary_column,
        model.node_count(),
        model.link_count(),
        session.live().nodes.len(),
        session.live().links.len()
    );

    for node_type in model.node_types() {
        let total = model.nodes_of_type(node_type).count();
        let visible = session
            .live()
            .nodes
            .iter()
            .filter(|node| node.node_type == node_type)
            .count();
        let color = session
            .color(node_type)
            .map(Rgb::to_hex)
            .unwrap_or_default();
        let mode = session.config().mode(node_type);
        let labels = if session.label_visible(node_type) {
            "labels"
        } else {
            "no labels"
        };
        println!(
            "  {color} {node_type}: {visible}/{total} visible, {}, {labels}",
            mode.as_str()
        );
    }
}

fn print_json(session: &Session) -> Result<()> {
    let Some(model) = session.model() else {
        return Ok(());
    };

    let live = session.live();
    let nodes = live
        .nodes
        .iter()
        .map(|node| RenderedNode {
            id: &node.id,
            name: &node.name,
            node_type: &node.node_type,
            primary: node.primary,
            degree: node.degree,
            radius: node_radius(node.degree),
            color: session.color(&node.node_type),
            label_lines: session
                .label_visible(&node.node_type)
                .then(|| session.label_lines(&node.name)),
        })
        .collect();

    let rendered = Rendered {
        primary_column: &model.primary_column,
        nodes,
        links: &live.links,
    };
    let json = serde_json::to_string_pretty(&rendered).context("failed to serialise live model")?;
    println!("{json}");
    Ok(())
}
