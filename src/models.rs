//! Built-in model list and the merged, searchable entry list
//!
//! The list shown by the picker is derived, never stored: user-added entries
//! first in their stored order, then the built-ins in declaration order.

/// A model shipped with the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinModel {
    pub value: &'static str,
    pub label: &'static str,
}

/// Built-in models, in display order
pub const BUILTIN_MODELS: &[BuiltinModel] = &[
    BuiltinModel {
        value: "Qwen/Qwen3-VL-32B-Instruct",
        label: "Qwen/Qwen3-VL-32B-Instruct",
    },
    BuiltinModel {
        value: "Qwen/Qwen3-VL-8B-Thinking",
        label: "Qwen/Qwen3-VL-8B-Thinking",
    },
    BuiltinModel {
        value: "zai-org/GLM-4.6V",
        label: "zai-org/GLM-4.6V",
    },
    BuiltinModel {
        value: "gpt-5-mini",
        label: "gpt-5-mini",
    },
    BuiltinModel {
        value: "gpt-5.1-codex",
        label: "gpt-5.1-codex",
    },
    BuiltinModel {
        value: "gpt-5.2",
        label: "gpt-5.2",
    },
];

/// One row of the merged list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub value: String,
    pub label: String,
    /// User-added, and therefore deletable
    pub is_custom: bool,
}

impl ListEntry {
    fn custom(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
            is_custom: true,
        }
    }
}

impl From<&BuiltinModel> for ListEntry {
    fn from(model: &BuiltinModel) -> Self {
        Self {
            value: model.value.to_string(),
            label: model.label.to_string(),
            is_custom: false,
        }
    }
}

/// Custom entries followed by the built-ins
pub fn derive_list(custom_models: &[String]) -> Vec<ListEntry> {
    custom_models
        .iter()
        .map(|m| ListEntry::custom(m))
        .chain(BUILTIN_MODELS.iter().map(ListEntry::from))
        .collect()
}

/// Entries whose label contains `search`, ignoring case. Order is preserved.
pub fn filter_list<'a>(list: &'a [ListEntry], search: &str) -> Vec<&'a ListEntry> {
    let needle = search.to_lowercase();
    list.iter()
        .filter(|entry| entry.label.to_lowercase().contains(&needle))
        .collect()
}

/// Whether the "create" row is offered: the search is non-empty and no
/// visible entry's label equals it, ignoring case.
pub fn show_create(filtered: &[&ListEntry], search: &str) -> bool {
    if search.is_empty() {
        return false;
    }
    let needle = search.to_lowercase();
    !filtered.iter().any(|entry| entry.label.to_lowercase() == needle)
}

/// Entry with exactly this value
pub fn find_entry<'a>(list: &'a [ListEntry], value: &str) -> Option<&'a ListEntry> {
    list.iter().find(|entry| entry.value == value)
}
