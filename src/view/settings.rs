use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use crate::error::GraphError;

use super::visibility::{VisibilityConfig, VisibilityMode};

pub const SETTINGS_KEY: &str = "settings";
pub const DATA_KEY: &str = "data";

pub const LABELS_CONTROL: &str = " display labels";
pub const MODE_CONTROL: &str = "-mode";
pub const SELECTED_CONTROL: &str = " selected";

const LABELS_ON: &str = "on";

/// Settings flattened to one array of strings per control key.
pub type FlatSettings = BTreeMap<String, Vec<String>>;

/// Key-value persistence with last-write-wins semantics.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// A store kept as a single JSON object on disk, rewritten on every `set`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!(path = %path.display(), %error, "ignoring corrupt settings store");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self { path, values }
    }

    fn flush(&self) -> std::io::Result<()> {
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw)
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
        if let Err(error) = self.flush() {
            tracing::warn!(path = %self.path.display(), %error, "failed to write settings store");
        }
    }
}

pub fn setting_key(node_type: &str, control: &str) -> String {
    urlencoding::encode(&format!("{node_type}{control}")).into_owned()
}

pub fn encode_settings(config: &VisibilityConfig) -> FlatSettings {
    let mut flat = FlatSettings::new();

    for (node_type, visibility) in &config.types {
        let labels = if visibility.show_labels {
            vec![LABELS_ON.to_string()]
        } else {
            Vec::new()
        };
        flat.insert(setting_key(node_type, LABELS_CONTROL), labels);
        flat.insert(
            setting_key(node_type, MODE_CONTROL),
            vec![visibility.mode.as_str().to_string()],
        );
        flat.insert(
            setting_key(node_type, SELECTED_CONTROL),
            visibility.selected_names.iter().cloned().collect(),
        );
    }

    flat
}

/// Keys that do not decode to a known control, and modes that are not
/// recognised, are skipped so the affected type keeps its defaults.
pub fn decode_settings(flat: &FlatSettings) -> VisibilityConfig {
    let mut config = VisibilityConfig::default();

    for (key, values) in flat {
        let Ok(decoded) = urlencoding::decode(key) else {
            continue;
        };

        if let Some(node_type) = decoded.strip_suffix(LABELS_CONTROL) {
            config.entry(node_type).show_labels = !values.is_empty();
        } else if let Some(node_type) = decoded.strip_suffix(MODE_CONTROL) {
            if let Some(mode) = values.first().and_then(|value| VisibilityMode::parse(value)) {
                config.entry(node_type).mode = mode;
            }
        } else if let Some(node_type) = decoded.strip_suffix(SELECTED_CONTROL) {
            config
                .entry(node_type)
                .selected_names
                .extend(values.iter().cloned());
        }
    }

    config
}

/// Reads the saved settings; anything unreadable yields an empty mapping.
pub fn load_settings(store: &dyn SettingsStore) -> FlatSettings {
    let Some(raw) = store.get(SETTINGS_KEY) else {
        return FlatSettings::new();
    };

    serde_json::from_str(&raw).unwrap_or_else(|error| {
        let error = GraphError::SettingsDecode {
            reason: error.to_string(),
        };
        tracing::warn!(%error, "falling back to default visibility settings");
        FlatSettings::new()
    })
}

pub fn save_settings(store: &mut dyn SettingsStore, flat: &FlatSettings) {
    match serde_json::to_string(flat) {
        Ok(raw) => store.set(SETTINGS_KEY, raw),
        Err(error) => tracing::warn!(%error, "failed to serialise visibility settings"),
    }
}
