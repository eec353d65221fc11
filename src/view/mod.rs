mod adjacency;
mod search;
mod session;
mod settings;
mod style;
mod visibility;

pub use adjacency::{ADJACENCY_PASSES, adjacent_nodes};
pub use search::{SELECTION_LIST_MAX_ROWS, names_by_type, search_names, selection_list_rows};
pub use session::{Command, GraphObserver, Session};
pub use settings::{
    DATA_KEY, FlatSettings, JsonFileStore, LABELS_CONTROL, MODE_CONTROL, MemoryStore,
    SELECTED_CONTROL, SETTINGS_KEY, SettingsStore, decode_settings, encode_settings,
    load_settings, save_settings, setting_key,
};
pub use style::{Rgb, assign_colors, rainbow, wrap_label};
pub use visibility::{LiveModel, TypeVisibility, VisibilityConfig, VisibilityMode, compute_live};
