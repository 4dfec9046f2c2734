// Library exports for settings-picker
// This allows the modules to be imported in tests and external code

pub mod config;
pub mod models;
pub mod store;
pub mod tui;

pub use config::{PartialSettings, Setting, SettingKey, Settings, SettingsError};
pub use models::{derive_list, filter_list, show_create, ListEntry, BUILTIN_MODELS};
pub use store::{FileStorage, MemoryStorage, SettingsStore};
pub use tui::{ModelPicker, PickerHost, PickerProps};
