//! Picker host
//!
//! Owns the settings store and a [`ModelPicker`], and plays the role of the
//! picker's caller: every selection the picker reports is saved as the
//! `model` setting and pushed back into the picker's props.

use std::sync::mpsc::{channel, Receiver};

use crate::config::Setting;
use crate::store::SettingsStore;

use super::model_picker::{ModelPicker, PickerProps};

/// Discrete user events understood by the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    Open,
    Dismiss,
    Input(char),
    Backspace,
    Up,
    Down,
    /// Commit the highlighted row
    Activate,
    /// Delete the highlighted row if it is a custom model
    DeleteHighlighted,
    Quit,
}

pub struct PickerHost {
    store: SettingsStore,
    picker: ModelPicker,
    changes: Receiver<String>,
}

impl PickerHost {
    pub fn new(store: SettingsStore) -> Self {
        Self::with_props(store, PickerProps::default())
    }

    /// `props.value` is replaced by the store's current model
    pub fn with_props(store: SettingsStore, mut props: PickerProps) -> Self {
        let (tx, changes) = channel();
        props.value = store.model().to_string();
        let picker = ModelPicker::new(props, move |value| {
            let _ = tx.send(value);
        });
        Self {
            store,
            picker,
            changes,
        }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn picker(&self) -> &ModelPicker {
        &self.picker
    }

    pub fn into_store(self) -> SettingsStore {
        self.store
    }

    /// Apply one event. Returns `false` once the host should exit.
    pub fn dispatch(&mut self, action: PickerAction) -> bool {
        match action {
            PickerAction::Open => self.picker.open(),
            PickerAction::Dismiss => self.picker.dismiss(),
            PickerAction::Input(c) => self.picker.push_search_char(c),
            PickerAction::Backspace => self.picker.pop_search_char(),
            PickerAction::Up => self.picker.move_up(),
            PickerAction::Down => self.picker.move_down(&self.store),
            PickerAction::Activate => self.picker.activate(&mut self.store),
            PickerAction::DeleteHighlighted => self.picker.delete_highlighted(&mut self.store),
            PickerAction::Quit => return false,
        }
        self.apply_changes();
        true
    }

    /// Type `name` and commit it through the create row semantics.
    /// Returns the reported selection, if any.
    pub fn create(&mut self, name: &str) -> Option<String> {
        self.picker.open();
        self.picker.set_search(name);
        self.picker.create(&mut self.store);
        self.apply_changes()
    }

    /// Toggle selection of a listed model. Returns the reported selection,
    /// `None` when `value` is not in the list.
    pub fn select(&mut self, value: &str) -> Option<String> {
        self.picker.open();
        self.picker.set_search("");
        self.picker.select(&self.store, value);
        self.apply_changes()
    }

    /// Delete a custom model. Returns the reported selection, if it changed.
    pub fn delete(&mut self, value: &str) -> Option<String> {
        self.picker.delete(&mut self.store, value);
        self.apply_changes()
    }

    /// Drain reported selections into the store. Returns the last one.
    fn apply_changes(&mut self) -> Option<String> {
        let mut last = None;
        while let Ok(value) = self.changes.try_recv() {
            self.store.update_setting(Setting::Model(value.clone()));
            self.picker.set_value(value.clone());
            last = Some(value);
        }
        last
    }
}
