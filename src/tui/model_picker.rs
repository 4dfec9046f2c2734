//! Model picker component
//!
//! A searchable single-select list over built-in and user-added models.
//! The picker owns only its transient UI state (open/closed, search text,
//! highlighted row). The selected value belongs to the host: the picker
//! reads it from [`PickerProps`] and reports every committed change through
//! the `on_change` callback. User-added models are written through the
//! [`SettingsStore`] passed to each mutating call.

use crate::config::Setting;
use crate::models::{derive_list, filter_list, find_entry, show_create, ListEntry};
use crate::store::SettingsStore;

/// Text shown on the trigger when nothing is selected
pub const PLACEHOLDER: &str = "Select model...";

/// Callback receiving the new selection (empty string means "none")
pub type OnChange = Box<dyn FnMut(String)>;

/// Open/closed state of the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerState {
    #[default]
    Closed,
    Open,
}

/// Values supplied by the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickerProps {
    /// Currently selected model, empty for none
    pub value: String,
    pub disabled: bool,
    /// Preferred popup width in columns
    pub width: Option<u16>,
}

impl PickerProps {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }
}

/// A visible row of the open popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerRow {
    Entry(ListEntry),
    /// Offer to add the current search text as a custom model
    Create(String),
}

/// Model picker state
pub struct ModelPicker {
    props: PickerProps,
    on_change: OnChange,
    state: PickerState,
    /// Filter/search text
    search: String,
    /// Index into [`ModelPicker::rows`]
    highlighted: usize,
}

impl ModelPicker {
    pub fn new(props: PickerProps, on_change: impl FnMut(String) + 'static) -> Self {
        Self {
            props,
            on_change: Box::new(on_change),
            state: PickerState::Closed,
            search: String::new(),
            highlighted: 0,
        }
    }

    pub fn props(&self) -> &PickerProps {
        &self.props
    }

    pub fn value(&self) -> &str {
        &self.props.value
    }

    /// Push the host's current selection back into the picker
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.props.value = value.into();
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.props.disabled = disabled;
        if disabled {
            self.state = PickerState::Closed;
        }
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PickerState::Open
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Open the popup. Search text from an earlier dismiss is kept.
    pub fn open(&mut self) {
        if self.props.disabled {
            return;
        }
        self.state = PickerState::Open;
    }

    /// Close without committing. Search text is kept.
    pub fn dismiss(&mut self) {
        self.state = PickerState::Closed;
    }

    /// Update search text
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.highlighted = 0;
    }

    /// Add character to search
    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.highlighted = 0;
    }

    /// Remove last character from search
    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.highlighted = 0;
    }

    /// Merged list for the store's current custom models
    pub fn entries(&self, store: &SettingsStore) -> Vec<ListEntry> {
        derive_list(store.custom_models())
    }

    /// Entries matching the current search
    pub fn filtered_entries(&self, store: &SettingsStore) -> Vec<ListEntry> {
        let list = self.entries(store);
        filter_list(&list, &self.search).into_iter().cloned().collect()
    }

    /// Whether the "create" row is offered for the current search
    pub fn can_create(&self, store: &SettingsStore) -> bool {
        let list = self.entries(store);
        let filtered = filter_list(&list, &self.search);
        show_create(&filtered, &self.search)
    }

    /// Rows of the open popup: matching entries, then the create row if offered
    pub fn rows(&self, store: &SettingsStore) -> Vec<PickerRow> {
        let list = self.entries(store);
        let filtered = filter_list(&list, &self.search);
        let create = show_create(&filtered, &self.search);

        let mut rows: Vec<PickerRow> = filtered
            .into_iter()
            .cloned()
            .map(PickerRow::Entry)
            .collect();
        if create {
            rows.push(PickerRow::Create(self.search.clone()));
        }
        rows
    }

    /// Label for the closed trigger
    pub fn trigger_label(&self, store: &SettingsStore) -> String {
        if self.props.value.is_empty() {
            return PLACEHOLDER.to_string();
        }
        let list = self.entries(store);
        find_entry(&list, &self.props.value)
            .map(|entry| entry.label.clone())
            .unwrap_or_else(|| self.props.value.clone())
    }

    /// Whether `entry` carries the check mark
    pub fn is_checked(&self, entry: &ListEntry) -> bool {
        !self.props.value.is_empty() && entry.value == self.props.value
    }

    /// Choose a visible entry. Choosing the current value clears the
    /// selection. Values not in the filtered list are ignored; new models go
    /// through [`ModelPicker::create`].
    pub fn select(&mut self, store: &SettingsStore, value: &str) {
        if self.props.disabled {
            return;
        }
        let list = self.entries(store);
        if !filter_list(&list, &self.search).iter().any(|entry| entry.value == value) {
            tracing::debug!("Model {} is not listed, ignoring selection", value);
            return;
        }
        let next = if value == self.props.value {
            String::new()
        } else {
            value.to_string()
        };
        self.commit(next);
    }

    /// Add the trimmed search text as a custom model and select it.
    ///
    /// If any entry already has that value it is selected instead and
    /// nothing is added. Blank search text does nothing.
    pub fn create(&mut self, store: &mut SettingsStore) {
        if self.props.disabled {
            return;
        }
        let value = self.search.trim().to_string();
        if value.is_empty() {
            return;
        }

        let list = self.entries(store);
        if find_entry(&list, &value).is_some() {
            tracing::debug!("Model {} already listed, selecting it", value);
            self.commit(value);
            return;
        }

        let mut custom_models = store.custom_models().to_vec();
        custom_models.push(value.clone());
        store.update_setting(Setting::CustomModels(custom_models));
        tracing::debug!("Added custom model {}", value);
        self.commit(value);
    }

    /// Remove a custom model. Clears the selection if it was selected.
    ///
    /// Built-in models and unknown values are left alone. Does not change
    /// the open/closed state.
    pub fn delete(&mut self, store: &mut SettingsStore, value: &str) {
        if self.props.disabled {
            return;
        }
        if !store.custom_models().iter().any(|m| m == value) {
            return;
        }

        let remaining: Vec<String> = store
            .custom_models()
            .iter()
            .filter(|m| m.as_str() != value)
            .cloned()
            .collect();
        store.update_setting(Setting::CustomModels(remaining));
        tracing::debug!("Removed custom model {}", value);

        if self.props.value == value {
            self.emit(String::new());
        }
        self.clamp_highlight(store);
    }

    /// Move highlight up
    pub fn move_up(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    /// Move highlight down
    pub fn move_down(&mut self, store: &SettingsStore) {
        let count = self.rows(store).len();
        if count > 0 && self.highlighted < count - 1 {
            self.highlighted += 1;
        }
    }

    /// Commit the highlighted row
    pub fn activate(&mut self, store: &mut SettingsStore) {
        match self.rows(store).into_iter().nth(self.highlighted) {
            Some(PickerRow::Entry(entry)) => self.select(store, &entry.value),
            Some(PickerRow::Create(_)) => self.create(store),
            None => {}
        }
    }

    /// Delete the highlighted row if it is a custom model
    pub fn delete_highlighted(&mut self, store: &mut SettingsStore) {
        if let Some(PickerRow::Entry(entry)) = self.rows(store).into_iter().nth(self.highlighted) {
            if entry.is_custom {
                self.delete(store, &entry.value);
            }
        }
    }

    fn clamp_highlight(&mut self, store: &SettingsStore) {
        let count = self.rows(store).len();
        if self.highlighted >= count {
            self.highlighted = count.saturating_sub(1);
        }
    }

    fn emit(&mut self, value: String) {
        (self.on_change)(value);
    }

    fn commit(&mut self, value: String) {
        self.emit(value);
        self.state = PickerState::Closed;
        self.search.clear();
        self.highlighted = 0;
    }
}

impl std::fmt::Debug for ModelPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelPicker")
            .field("props", &self.props)
            .field("state", &self.state)
            .field("search", &self.search)
            .field("highlighted", &self.highlighted)
            .finish_non_exhaustive()
    }
}
