use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{Receiver, TryRecvError};

use crate::data::{GraphModel, RawInputSource, build_graph, normalize_rows, parse_csv, spawn_read};
use crate::error::{GraphError, Result};

use super::search::names_by_type;
use super::settings::{
    DATA_KEY, SettingsStore, decode_settings, encode_settings, load_settings, save_settings,
};
use super::style::{Rgb, assign_colors, wrap_label};
use super::visibility::{LiveModel, TypeVisibility, VisibilityConfig, VisibilityMode, compute_live};

/// Receives the session's outputs; both callbacks default to doing nothing.
pub trait GraphObserver {
    fn model_rebuilt(&mut self, _model: &GraphModel) {}

    fn visibility_changed(&mut self, _live: &LiveModel) {}
}

/// A UI change, delivered to [`Session::run`] one at a time.
#[derive(Clone, Debug)]
pub enum Command {
    Upload(String),
    SetMode { node_type: String, mode: String },
    SetSelected { node_type: String, names: Vec<String> },
    SetShowLabels { node_type: String, show: bool },
    Apply(VisibilityConfig),
}

/// Owns the full model, the visibility configuration and the live subset.
///
/// Every change recomputes the live model from scratch and persists the
/// configuration. `&mut self` on every mutation keeps recomputes serialised.
pub struct Session {
    store: Box<dyn SettingsStore>,
    observers: Vec<Box<dyn GraphObserver>>,
    model: Option<GraphModel>,
    colors: BTreeMap<String, Rgb>,
    config: VisibilityConfig,
    live: LiveModel,
    pending: Option<Receiver<Result<String>>>,
}

impl Session {
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        let config = decode_settings(&load_settings(store.as_ref()));
        Self {
            store,
            observers: Vec::new(),
            model: None,
            colors: BTreeMap::new(),
            config,
            live: LiveModel::default(),
            pending: None,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn GraphObserver>) {
        self.observers.push(observer);
    }

    pub fn model(&self) -> Option<&GraphModel> {
        self.model.as_ref()
    }

    pub fn live(&self) -> &LiveModel {
        &self.live
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    pub fn color(&self, node_type: &str) -> Option<Rgb> {
        self.colors.get(node_type).copied()
    }

    pub fn label_lines(&self, name: &str) -> Vec<String> {
        wrap_label(name)
    }

    pub fn label_visible(&self, node_type: &str) -> bool {
        self.config.show_labels(node_type)
    }

    pub fn hidden_label_types(&self) -> Vec<&str> {
        self.model
            .as_ref()
            .map(|model| {
                model
                    .node_types()
                    .into_iter()
                    .filter(|node_type| !self.config.show_labels(node_type))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn names_by_type(&self) -> Vec<(String, Vec<String>)> {
        self.model
            .as_ref()
            .map(|model| names_by_type(&model.nodes))
            .unwrap_or_default()
    }

    /// Replaces the model with one built from `raw`.
    ///
    /// On error nothing changes. Saved settings for types present in the new
    /// model are restored; settings for other types are dropped.
    pub fn load_text(&mut self, raw: &str) -> Result<()> {
        let rows = normalize_rows(parse_csv(raw)?)?;
        let model = build_graph(&rows)?;

        let mut config = decode_settings(&load_settings(self.store.as_ref()));
        config
            .types
            .retain(|node_type, _| model.has_type(node_type));
        for (node_type, visibility) in config.types.iter_mut() {
            visibility
                .selected_names
                .retain(|name| model.has_name(node_type, name));
        }

        self.colors = assign_colors(model.nodes.iter().map(|node| node.node_type.as_str()));
        self.config = config;
        self.model = Some(model);

        if let Some(model) = &self.model {
            for observer in &mut self.observers {
                observer.model_rebuilt(model);
            }
        }
        self.recompute();
        Ok(())
    }

    /// Like [`Session::load_text`], and remembers `raw` for the next session.
    pub fn upload(&mut self, raw: &str) -> Result<()> {
        self.load_text(raw)?;
        self.store.set(DATA_KEY, raw.to_string());
        Ok(())
    }

    pub fn load_from(&mut self, source: &dyn RawInputSource) -> Result<()> {
        let raw = Self::read(source)?;
        self.load_text(&raw)
    }

    pub fn upload_from(&mut self, source: &dyn RawInputSource) -> Result<()> {
        let raw = Self::read(source)?;
        self.upload(&raw)
    }

    fn read(source: &dyn RawInputSource) -> Result<String> {
        source.read().inspect_err(|error| {
            tracing::warn!(source = %source.name(), %error, "failed to read data");
        })
    }

    /// Loads the data remembered by the last upload. Returns `false` if none.
    pub fn load_from_store(&mut self) -> Result<bool> {
        let Some(raw) = self.store.get(DATA_KEY) else {
            return Ok(false);
        };
        self.load_text(&raw)?;
        Ok(true)
    }

    /// Starts reading `source` in the background; see [`Session::poll_load`].
    pub fn begin_load<S: RawInputSource>(&mut self, source: S) {
        self.pending = Some(spawn_read(source));
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Applies a finished background read, if there is one.
    pub fn poll_load(&mut self) -> Option<Result<()>> {
        let rx = self.pending.take()?;
        let read = match rx.try_recv() {
            Ok(read) => read,
            Err(TryRecvError::Empty) => {
                self.pending = Some(rx);
                return None;
            }
            Err(TryRecvError::Disconnected) => Err(Self::disconnected()),
        };
        Some(self.apply_read(read))
    }

    /// Blocks until the background read finishes and applies it.
    pub fn finish_load(&mut self) -> Option<Result<()>> {
        let rx = self.pending.take()?;
        let read = rx.recv().unwrap_or_else(|_| Err(Self::disconnected()));
        Some(self.apply_read(read))
    }

    fn disconnected() -> GraphError {
        GraphError::read_failure("background reader", "worker disconnected")
    }

    fn apply_read(&mut self, read: Result<String>) -> Result<()> {
        let raw = read.inspect_err(|error| {
            tracing::warn!(%error, "background read failed");
        })?;
        self.load_text(&raw)
    }

    fn knows_type(&self, node_type: &str) -> bool {
        self.model
            .as_ref()
            .is_some_and(|model| model.has_type(node_type))
    }

    fn names_of_type(&self, node_type: &str) -> BTreeSet<String> {
        self.model
            .as_ref()
            .map(|model| {
                model
                    .nodes_of_type(node_type)
                    .map(|node| node.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Changes a type's mode. Unknown types and modes are ignored.
    ///
    /// `none` clears the type's selection and `all` selects every name.
    pub fn set_mode(&mut self, node_type: &str, mode: &str) -> bool {
        let Some(mode) = VisibilityMode::parse(mode) else {
            tracing::warn!(node_type, mode, "ignoring unknown visibility mode");
            return false;
        };
        if !self.knows_type(node_type) {
            tracing::warn!(node_type, "ignoring mode change for unknown node type");
            return false;
        }

        let all_names = self.names_of_type(node_type);
        let visibility = self.config.entry(node_type);
        visibility.mode = mode;
        match mode {
            VisibilityMode::None => visibility.selected_names.clear(),
            VisibilityMode::All => visibility.selected_names = all_names,
            VisibilityMode::Adjacent | VisibilityMode::Selected => {}
        }

        self.recompute();
        true
    }

    /// Replaces a type's selection, keeping only names that exist.
    pub fn set_selected<I, S>(&mut self, node_type: &str, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.knows_type(node_type) {
            tracing::warn!(node_type, "ignoring selection for unknown node type");
            return false;
        }

        let known = self.names_of_type(node_type);
        self.config.entry(node_type).selected_names = names
            .into_iter()
            .map(Into::into)
            .filter(|name| known.contains(name))
            .collect();

        self.recompute();
        true
    }

    pub fn set_show_labels(&mut self, node_type: &str, show: bool) -> bool {
        if !self.knows_type(node_type) {
            tracing::warn!(node_type, "ignoring label toggle for unknown node type");
            return false;
        }

        self.config.entry(node_type).show_labels = show;
        self.recompute();
        true
    }

    /// Replaces the whole entry of each type named in `partial`.
    ///
    /// Fields of a named type that the caller leaves at their defaults are
    /// reset too; use [`Session::set_mode`] and friends to change one field.
    /// Entries for unknown types are ignored.
    pub fn apply_visibility_config(&mut self, partial: VisibilityConfig) {
        for (node_type, visibility) in partial.types {
            if !self.knows_type(&node_type) {
                tracing::warn!(node_type = %node_type, "ignoring settings for unknown node type");
                continue;
            }

            let known = self.names_of_type(&node_type);
            let TypeVisibility {
                mode,
                selected_names,
                show_labels,
            } = visibility;
            self.config.types.insert(
                node_type,
                TypeVisibility {
                    mode,
                    selected_names: selected_names
                        .into_iter()
                        .filter(|name| known.contains(name))
                        .collect(),
                    show_labels,
                },
            );
        }

        self.recompute();
    }

    pub fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Upload(raw) => return self.upload(&raw),
            Command::SetMode { node_type, mode } => {
                self.set_mode(&node_type, &mode);
            }
            Command::SetSelected { node_type, names } => {
                self.set_selected(&node_type, names);
            }
            Command::SetShowLabels { node_type, show } => {
                self.set_show_labels(&node_type, show);
            }
            Command::Apply(partial) => self.apply_visibility_config(partial),
        }
        Ok(())
    }

    /// Handles commands in arrival order until every sender is dropped.
    pub fn run(&mut self, rx: Receiver<Command>) {
        for command in rx {
            if let Err(error) = self.dispatch(command) {
                tracing::warn!(%error, "command failed");
            }
        }
    }

    fn recompute(&mut self) {
        let Some(model) = &self.model else {
            self.live = LiveModel::default();
            return;
        };

        self.live = compute_live(&model.nodes, &model.links, &self.config);
        tracing::debug!(
            nodes = self.live.nodes.len(),
            links = self.live.links.len(),
            "recomputed live model"
        );

        save_settings(self.store.as_mut(), &encode_settings(&self.config));
        for observer in &mut self.observers {
            observer.visibility_changed(&self.live);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;

    use pretty_assertions::assert_eq;

    use crate::data::TextSource;
    use crate::view::settings::{MemoryStore, SETTINGS_KEY};

    use super::*;

    const CSV: &str = "Company,other_node,other_node_type\n\
                       Acme,Bob,Person\n\
                       ,Carol,Person\n\
                       Globex,Leeds,Site\n";

    #[derive(Default)]
    struct Recorder {
        rebuilt: usize,
        live_sizes: Vec<usize>,
    }

    struct SharedRecorder(Rc<RefCell<Recorder>>);

    impl GraphObserver for SharedRecorder {
        fn model_rebuilt(&mut self, _model: &GraphModel) {
            self.0.borrow_mut().rebuilt += 1;
        }

        fn visibility_changed(&mut self, live: &LiveModel) {
            self.0.borrow_mut().live_sizes.push(live.nodes.len());
        }
    }

    fn loaded_session() -> Session {
        let mut session = Session::new(Box::new(MemoryStore::new()));
        session.load_text(CSV).unwrap();
        session
    }

    fn live_ids(session: &Session) -> Vec<&str> {
        session
            .live()
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect()
    }

    #[test]
    fn observers_see_rebuilds_and_recomputes() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut session = Session::new(Box::new(MemoryStore::new()));
        session.add_observer(Box::new(SharedRecorder(recorder.clone())));

        session.load_text(CSV).unwrap();
        session.set_mode("Company", "all");

        let recorder = recorder.borrow();
        assert_eq!(recorder.rebuilt, 1);
        assert_eq!(recorder.live_sizes, vec![0, 5]);
    }

    #[test]
    fn failed_rebuild_keeps_existing_model() {
        let mut session = loaded_session();
        session.set_mode("Company", "all");

        let error = session.load_text("just,one\nrow,here\n").unwrap_err();

        assert!(matches!(error, GraphError::MalformedInput { .. }));
        assert_eq!(session.model().map(GraphModel::node_count), Some(5));
        assert_eq!(session.live().nodes.len(), 5);
    }

    #[test]
    fn read_failure_leaves_session_untouched() {
        let mut session = loaded_session();
        let source = crate::data::FileSource::new("/nonexistent/graph-visualisation.csv");

        assert!(matches!(
            session.load_from(&source),
            Err(GraphError::ReadFailure { .. })
        ));
        assert_eq!(session.model().map(GraphModel::node_count), Some(5));
    }

    #[test]
    fn invalid_changes_are_ignored() {
        let mut session = loaded_session();

        assert!(!session.set_mode("Company", "sideways"));
        assert!(!session.set_mode("Planet", "all"));
        assert!(!session.set_show_labels("Planet", false));
        assert_eq!(session.config(), &VisibilityConfig::default());
    }

    #[test]
    fn mode_switches_adjust_selection() {
        let mut session = loaded_session();

        session.set_mode("Person", "all");
        assert_eq!(
            session.config().types["Person"].selected_names,
            BTreeSet::from(["Bob".to_string(), "Carol".to_string()])
        );

        session.set_mode("Person", "none");
        assert!(session.config().types["Person"].selected_names.is_empty());
    }

    #[test]
    fn selection_drives_live_model() {
        let mut session = loaded_session();

        session.set_mode("Company", "selected");
        session.set_selected("Company", ["Globex", "Nobody"]);

        assert_eq!(live_ids(&session), vec!["Company: Globex", "Site: Leeds"]);
        assert_eq!(
            session.config().types["Company"].selected_names,
            BTreeSet::from(["Globex".to_string()])
        );
    }

    #[test]
    fn settings_persist_across_sessions() {
        let mut session = loaded_session();
        session.set_mode("Company", "all");
        session.set_show_labels("Person", false);
        let saved = session.store.get(SETTINGS_KEY).unwrap();

        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, saved);
        let mut restored = Session::new(Box::new(store));
        restored.load_text(CSV).unwrap();

        assert_eq!(restored.config().mode("Company"), VisibilityMode::All);
        assert!(!restored.label_visible("Person"));
        assert_eq!(restored.hidden_label_types(), vec!["Person"]);
        assert_eq!(restored.live().nodes.len(), 5);
    }

    #[test]
    fn uploads_are_remembered() {
        let mut session = Session::new(Box::new(MemoryStore::new()));
        session.upload(CSV).unwrap();
        let remembered = session.store.get(DATA_KEY).unwrap();

        let mut store = MemoryStore::new();
        store.set(DATA_KEY, remembered);
        let mut next = Session::new(Box::new(store));

        assert!(next.load_from_store().unwrap());
        assert_eq!(next.model().map(GraphModel::link_count), Some(3));
    }

    #[test]
    fn background_load_is_applied_when_finished() {
        let mut session = Session::new(Box::new(MemoryStore::new()));
        session.begin_load(TextSource::new("upload.csv", CSV));
        assert!(session.is_loading());

        session.finish_load().unwrap().unwrap();

        assert!(!session.is_loading());
        assert_eq!(session.model().map(|model| model.primary_column.as_str()), Some("Company"));
    }

    #[test]
    fn failed_background_read_keeps_existing_model() {
        let mut session = loaded_session();
        session.set_mode("Company", "all");

        session.begin_load(crate::data::FileSource::new("/nonexistent/graph-visualisation.csv"));
        let result = session.finish_load().unwrap();

        assert!(matches!(result, Err(GraphError::ReadFailure { .. })));
        assert!(!session.is_loading());
        assert_eq!(session.model().map(GraphModel::node_count), Some(5));
        assert_eq!(session.live().nodes.len(), 5);
        assert_eq!(session.live().links.len(), 3);
    }

    #[test]
    fn applied_entries_replace_the_whole_type() {
        let mut session = loaded_session();
        session.set_show_labels("Person", false);
        session.set_mode("Person", "all");

        session.apply_visibility_config(
            VisibilityConfig::default()
                .with_mode("Person", VisibilityMode::Selected)
                .with_selected("Person", ["Bob"])
                .with_mode("Planet", VisibilityMode::All),
        );

        let person = &session.config().types["Person"];
        assert_eq!(person.mode, VisibilityMode::Selected);
        assert_eq!(person.selected_names, BTreeSet::from(["Bob".to_string()]));
        assert!(person.show_labels);
        assert!(!session.config().types.contains_key("Planet"));
        assert_eq!(live_ids(&session), vec!["Company: Acme", "Person: Bob"]);
    }

    #[test]
    fn commands_are_processed_in_order() {
        let mut session = Session::new(Box::new(MemoryStore::new()));
        let (tx, rx) = mpsc::channel();
        tx.send(Command::Upload(CSV.to_string())).unwrap();
        tx.send(Command::SetMode {
            node_type: "Site".to_string(),
            mode: "all".to_string(),
        })
        .unwrap();
        tx.send(Command::SetShowLabels {
            node_type: "Site".to_string(),
            show: false,
        })
        .unwrap();
        drop(tx);

        session.run(rx);

        assert_eq!(live_ids(&session), vec!["Company: Globex", "Site: Leeds"]);
        assert!(!session.label_visible("Site"));
    }

    #[test]
    fn colours_and_labels_are_exposed() {
        let session = loaded_session();

        assert!(session.color("Company").is_some());
        assert!(session.color("Planet").is_none());
        assert_eq!(session.label_lines("Acme"), vec!["Acme"]);
        assert_eq!(session.names_by_type()[0].0, "Company");
    }
}
