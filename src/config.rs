use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Name of the persisted settings record
pub const STORE_NAME: &str = "interview-coder-settings";

/// Schema version of the persisted record. Bump on incompatible field changes.
pub const STORE_VERSION: u32 = 4;

/// Environment variable overriding the storage directory
pub const HOME_ENV: &str = "INTERVIEW_CODER_HOME";

const APP_DIR: &str = "interview-coder";

fn default_opacity() -> f64 {
    0.8
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Unknown setting key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: SettingKey, reason: String },
}

/// Persisted application preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Endpoint override for the model API
    #[serde(rename = "apiBaseURL")]
    pub api_base_url: String,
    pub api_key: String,
    /// Currently selected model identifier (may be empty)
    pub model: String,
    /// User-added model identifiers, insertion ordered, no duplicates
    pub custom_models: Vec<String>,
    pub custom_prompt: String,
    pub opacity: f64,
    pub code_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_key: String::new(),
            model: String::new(),
            custom_models: Vec::new(),
            custom_prompt: String::new(),
            opacity: default_opacity(),
            code_language: String::new(),
        }
    }
}

impl Settings {
    /// Read one field as a typed setting
    pub fn get(&self, key: SettingKey) -> Setting {
        match key {
            SettingKey::ApiBaseUrl => Setting::ApiBaseUrl(self.api_base_url.clone()),
            SettingKey::ApiKey => Setting::ApiKey(self.api_key.clone()),
            SettingKey::Model => Setting::Model(self.model.clone()),
            SettingKey::CustomModels => Setting::CustomModels(self.custom_models.clone()),
            SettingKey::CustomPrompt => Setting::CustomPrompt(self.custom_prompt.clone()),
            SettingKey::Opacity => Setting::Opacity(self.opacity),
            SettingKey::CodeLanguage => Setting::CodeLanguage(self.code_language.clone()),
        }
    }

    /// Build a record from a JSON object, keeping only fields whose shape
    /// matches the declared type. Everything else takes its default.
    pub fn salvage(state: &Value) -> Self {
        let mut settings = Self::default();
        if let Some(object) = state.as_object() {
            for key in SettingKey::ALL {
                match object.get(key.as_str()).and_then(|v| Setting::from_json(key, v)) {
                    Some(setting) => {
                        setting.apply(&mut settings);
                    }
                    None => {
                        tracing::debug!("Dropping stored field {} (missing or wrong shape)", key);
                    }
                }
            }
        }
        settings
    }
}

/// Drop blank entries and duplicates, keeping the first occurrence
pub fn normalize_custom_models(models: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(models.len());
    for model in models {
        if model.trim().is_empty() || seen.contains(&model) {
            continue;
        }
        seen.push(model);
    }
    seen
}

/// Field names of [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ApiBaseUrl,
    ApiKey,
    Model,
    CustomModels,
    CustomPrompt,
    Opacity,
    CodeLanguage,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::ApiBaseUrl,
        SettingKey::ApiKey,
        SettingKey::Model,
        SettingKey::CustomModels,
        SettingKey::CustomPrompt,
        SettingKey::Opacity,
        SettingKey::CodeLanguage,
    ];

    /// Name as stored on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ApiBaseUrl => "apiBaseURL",
            SettingKey::ApiKey => "apiKey",
            SettingKey::Model => "model",
            SettingKey::CustomModels => "customModels",
            SettingKey::CustomPrompt => "customPrompt",
            SettingKey::Opacity => "opacity",
            SettingKey::CodeLanguage => "codeLanguage",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    /// Accepts the stored camelCase name as well as snake_case or kebab-case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str().to_lowercase() == folded)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// One field of [`Settings`] together with its value
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    ApiBaseUrl(String),
    ApiKey(String),
    Model(String),
    CustomModels(Vec<String>),
    CustomPrompt(String),
    Opacity(f64),
    CodeLanguage(String),
}

impl Setting {
    pub fn key(&self) -> SettingKey {
        match self {
            Setting::ApiBaseUrl(_) => SettingKey::ApiBaseUrl,
            Setting::ApiKey(_) => SettingKey::ApiKey,
            Setting::Model(_) => SettingKey::Model,
            Setting::CustomModels(_) => SettingKey::CustomModels,
            Setting::CustomPrompt(_) => SettingKey::CustomPrompt,
            Setting::Opacity(_) => SettingKey::Opacity,
            Setting::CodeLanguage(_) => SettingKey::CodeLanguage,
        }
    }

    /// Parse a raw command-line value for `key`.
    ///
    /// `customModels` takes a comma-separated list; blank and repeated items
    /// are skipped. `opacity` must be a finite number.
    pub fn parse(key: SettingKey, raw: &str) -> Result<Self, SettingsError> {
        let setting = match key {
            SettingKey::ApiBaseUrl => Setting::ApiBaseUrl(raw.to_string()),
            SettingKey::ApiKey => Setting::ApiKey(raw.to_string()),
            SettingKey::Model => Setting::Model(raw.to_string()),
            SettingKey::CustomModels => Setting::CustomModels(normalize_custom_models(
                raw.split(',').map(|s| s.trim().to_string()).collect(),
            )),
            SettingKey::CustomPrompt => Setting::CustomPrompt(raw.to_string()),
            SettingKey::Opacity => {
                let value = raw.trim().parse::<f64>().map_err(|e| SettingsError::InvalidValue {
                    key,
                    reason: e.to_string(),
                })?;
                check_opacity(value)?;
                Setting::Opacity(value)
            }
            SettingKey::CodeLanguage => Setting::CodeLanguage(raw.to_string()),
        };
        Ok(setting)
    }

    /// Typed view of a stored JSON value, `None` when the shape does not match
    pub fn from_json(key: SettingKey, value: &Value) -> Option<Self> {
        match key {
            SettingKey::CustomModels => {
                let items = value.as_array()?;
                let models = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()?;
                Some(Setting::CustomModels(models))
            }
            SettingKey::Opacity => value.as_f64().map(Setting::Opacity),
            _ => {
                let text = value.as_str()?.to_string();
                Some(match key {
                    SettingKey::ApiBaseUrl => Setting::ApiBaseUrl(text),
                    SettingKey::ApiKey => Setting::ApiKey(text),
                    SettingKey::Model => Setting::Model(text),
                    SettingKey::CustomPrompt => Setting::CustomPrompt(text),
                    _ => Setting::CodeLanguage(text),
                })
            }
        }
    }

    /// Write this value into `settings`. Returns whether anything changed.
    ///
    /// Custom model lists are normalized first. A non-finite opacity cannot
    /// be stored as JSON and is ignored.
    pub fn apply(self, settings: &mut Settings) -> bool {
        fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
            if *slot == value {
                return false;
            }
            *slot = value;
            true
        }

        match self {
            Setting::ApiBaseUrl(v) => replace(&mut settings.api_base_url, v),
            Setting::ApiKey(v) => replace(&mut settings.api_key, v),
            Setting::Model(v) => replace(&mut settings.model, v),
            Setting::CustomModels(v) => {
                replace(&mut settings.custom_models, normalize_custom_models(v))
            }
            Setting::CustomPrompt(v) => replace(&mut settings.custom_prompt, v),
            Setting::Opacity(v) if !v.is_finite() => {
                tracing::warn!("Ignoring non-finite opacity {}", v);
                false
            }
            Setting::Opacity(v) => replace(&mut settings.opacity, v),
            Setting::CodeLanguage(v) => replace(&mut settings.code_language, v),
        }
    }

    /// Human-readable value, lists joined with commas
    pub fn display_value(&self) -> String {
        match self {
            Setting::ApiBaseUrl(v)
            | Setting::ApiKey(v)
            | Setting::Model(v)
            | Setting::CustomPrompt(v)
            | Setting::CodeLanguage(v) => v.clone(),
            Setting::CustomModels(v) => v.join(","),
            Setting::Opacity(v) => v.to_string(),
        }
    }
}

fn check_opacity(value: f64) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::InvalidValue {
            key: SettingKey::Opacity,
            reason: format!("{} is not a finite number", value),
        })
    }
}

/// Any subset of [`Settings`], used for bulk import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSettings {
    #[serde(rename = "apiBaseURL", skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_models: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
}

impl PartialSettings {
    pub fn is_empty(&self) -> bool {
        self.to_settings().is_empty()
    }

    /// The mentioned fields as individual settings, in declaration order
    pub fn to_settings(&self) -> Vec<Setting> {
        let mut out = Vec::new();
        if let Some(v) = &self.api_base_url {
            out.push(Setting::ApiBaseUrl(v.clone()));
        }
        if let Some(v) = &self.api_key {
            out.push(Setting::ApiKey(v.clone()));
        }
        if let Some(v) = &self.model {
            out.push(Setting::Model(v.clone()));
        }
        if let Some(v) = &self.custom_models {
            out.push(Setting::CustomModels(v.clone()));
        }
        if let Some(v) = &self.custom_prompt {
            out.push(Setting::CustomPrompt(v.clone()));
        }
        if let Some(v) = self.opacity {
            out.push(Setting::Opacity(v));
        }
        if let Some(v) = &self.code_language {
            out.push(Setting::CodeLanguage(v.clone()));
        }
        out
    }

    /// Parse an import file body. TOML when `is_toml`, JSON otherwise.
    pub fn parse(content: &str, is_toml: bool) -> Result<Self> {
        let partial: Self = if is_toml {
            toml::from_str(content).context("Failed to parse TOML settings")?
        } else {
            serde_json::from_str(content).context("Failed to parse JSON settings")?
        };
        if let Some(opacity) = partial.opacity {
            check_opacity(opacity)?;
        }
        Ok(partial)
    }
}

impl From<Setting> for PartialSettings {
    fn from(setting: Setting) -> Self {
        let mut partial = Self::default();
        match setting {
            Setting::ApiBaseUrl(v) => partial.api_base_url = Some(v),
            Setting::ApiKey(v) => partial.api_key = Some(v),
            Setting::Model(v) => partial.model = Some(v),
            Setting::CustomModels(v) => partial.custom_models = Some(v),
            Setting::CustomPrompt(v) => partial.custom_prompt = Some(v),
            Setting::Opacity(v) => partial.opacity = Some(v),
            Setting::CodeLanguage(v) => partial.code_language = Some(v),
        }
        partial
    }
}

/// Directory holding the settings record.
///
/// Resolution order: explicit override, then `INTERVIEW_CODER_HOME`, then the
/// platform config directory.
pub fn storage_dir(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(APP_DIR))
}

/// File name of the settings record inside the storage directory
pub fn record_file_name() -> String {
    format!("{}.json", STORE_NAME)
}
