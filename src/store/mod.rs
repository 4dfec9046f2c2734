//! Process-wide settings store
//!
//! Holds the [`Settings`] record in memory and writes it through to a
//! [`SettingsStorage`] backend after every mutation. The record is loaded
//! once when the store is opened; stored records from another schema version
//! are migrated field by field or discarded.

mod storage;

pub use storage::{FileStorage, MemoryStorage, PersistedRecord, SettingsStorage, StorageError};

use crate::config::{
    normalize_custom_models, PartialSettings, Setting, Settings, STORE_VERSION,
};

/// How the in-memory record was produced when the store was opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet
    Defaults,
    /// Stored record at the current version
    Loaded,
    /// Stored record from an older version, salvaged field by field
    Migrated { from: u32 },
    /// Stored record unusable; defaults in effect
    Reset { reason: String },
}

pub struct SettingsStore {
    settings: Settings,
    storage: Box<dyn SettingsStorage>,
    /// False once a write has failed; the session continues in memory
    persistent: bool,
    outcome: LoadOutcome,
}

impl SettingsStore {
    /// Open the store, populating the record from `storage` or defaults
    pub fn open(storage: impl SettingsStorage + 'static) -> Self {
        let (settings, outcome) = load(&storage);
        tracing::debug!("Opened settings store at {}: {:?}", storage.location(), outcome);

        let mut store = Self {
            settings,
            storage: Box::new(storage),
            persistent: true,
            outcome,
        };

        if matches!(store.outcome, LoadOutcome::Migrated { .. }) {
            store.persist();
        }
        store
    }

    /// Store backed by a fresh [`MemoryStorage`]
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn custom_models(&self) -> &[String] {
        &self.settings.custom_models
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// Whether mutations still reach durable storage
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn location(&self) -> String {
        self.storage.location()
    }

    /// Replace exactly one field. Unchanged values are not rewritten.
    pub fn update_setting(&mut self, setting: Setting) {
        let key = setting.key();
        if setting.apply(&mut self.settings) {
            tracing::debug!("Updated setting {}", key);
            self.persist();
        }
    }

    /// Merge the mentioned fields into the record, leaving the rest untouched
    pub fn sync_settings(&mut self, partial: PartialSettings) {
        let mut changed = 0;
        for setting in partial.to_settings() {
            if setting.apply(&mut self.settings) {
                changed += 1;
            }
        }
        if changed > 0 {
            tracing::debug!("Synced {} setting(s)", changed);
            self.persist();
        }
    }

    /// Restore the default record and write it through
    pub fn reset(&mut self) {
        self.settings = Settings::default();
        tracing::debug!("Settings reset to defaults");
        self.persist();
    }

    fn persist(&mut self) {
        if !self.persistent {
            return;
        }

        let state = match serde_json::to_value(&self.settings) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Failed to serialize settings: {}", e);
                return;
            }
        };
        let record = PersistedRecord {
            state,
            version: STORE_VERSION,
        };

        if let Err(e) = self.storage.write(&record) {
            tracing::warn!(
                "Failed to persist settings to {}: {}. Continuing in memory only.",
                self.storage.location(),
                e
            );
            self.persistent = false;
        }
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("location", &self.storage.location())
            .field("persistent", &self.persistent)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

fn load(storage: &dyn SettingsStorage) -> (Settings, LoadOutcome) {
    let record = match storage.read() {
        Ok(Some(record)) => record,
        Ok(None) => return (Settings::default(), LoadOutcome::Defaults),
        Err(e) => {
            tracing::warn!("Failed to read settings from {}: {}", storage.location(), e);
            return (
                Settings::default(),
                LoadOutcome::Reset {
                    reason: e.to_string(),
                },
            );
        }
    };

    let (mut settings, outcome) = if record.version == STORE_VERSION {
        match serde_json::from_value::<Settings>(record.state.clone()) {
            Ok(settings) => (settings, LoadOutcome::Loaded),
            Err(e) => {
                tracing::warn!("Stored settings do not match the schema ({}), salvaging fields", e);
                (Settings::salvage(&record.state), LoadOutcome::Loaded)
            }
        }
    } else if record.version < STORE_VERSION {
        tracing::info!(
            "Migrating settings from version {} to {}",
            record.version,
            STORE_VERSION
        );
        (
            Settings::salvage(&record.state),
            LoadOutcome::Migrated {
                from: record.version,
            },
        )
    } else {
        tracing::warn!(
            "Stored settings version {} is newer than supported version {}, using defaults",
            record.version,
            STORE_VERSION
        );
        (
            Settings::default(),
            LoadOutcome::Reset {
                reason: format!("unsupported version {}", record.version),
            },
        )
    };

    settings.custom_models = normalize_custom_models(std::mem::take(&mut settings.custom_models));
    (settings, outcome)
}
