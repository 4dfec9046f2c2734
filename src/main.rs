use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings_picker::config::{self, PartialSettings, Setting, SettingKey};
use settings_picker::models::{derive_list, filter_list, show_create};
use settings_picker::store::{FileStorage, SettingsStore};
use settings_picker::tui::{PickerHost, PickerRunner};

#[derive(Parser)]
#[command(name = "settings-picker")]
#[command(version, about = "Persisted settings and model picker", long_about = None)]
struct Cli {
    /// Directory holding the settings record (default: platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read and write persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Manage the model list and the selected model
    Models {
        #[command(subcommand)]
        action: ModelsAction,
    },
    /// Pick a model interactively
    Pick {
        /// Popup width in columns
        #[arg(long)]
        width: Option<u16>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show all settings
    Show {
        /// Print the raw JSON record, secrets included
        #[arg(long)]
        json: bool,
    },
    /// Print one setting
    Get { key: String },
    /// Set one setting (customModels takes a comma-separated list)
    Set { key: String, value: String },
    /// Merge settings from a .json or .toml file
    Import { file: PathBuf },
    /// Restore defaults
    Reset,
    /// Print the settings file location
    Path,
}

#[derive(Subcommand)]
enum ModelsAction {
    /// List built-in and custom models
    List {
        /// Only show models whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Add a custom model and select it
    Add { name: String },
    /// Remove a custom model
    Remove { name: String },
    /// Select a model; selecting the current model clears the selection
    Select { name: String },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "settings_picker=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let dir = config::storage_dir(cli.dir)?;
    let store = SettingsStore::open(FileStorage::new(&dir));

    match cli.command {
        Commands::Settings { action } => handle_settings(store, action),
        Commands::Models { action } => handle_models(store, action),
        Commands::Pick { width } => run_picker(store, width),
    }
}

fn handle_settings(mut store: SettingsStore, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.settings())?);
            } else {
                let mut shown = store.settings().clone();
                shown.api_key = mask_secret(&shown.api_key);
                println!("Current settings:");
                println!("{}", toml::to_string_pretty(&shown)?);
            }
        }
        SettingsAction::Get { key } => {
            let key: SettingKey = key.parse()?;
            println!("{}", store.settings().get(key).display_value());
        }
        SettingsAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            store.update_setting(Setting::parse(key, &value)?);
            println!("{} updated", key);
            warn_if_memory_only(&store);
        }
        SettingsAction::Import { file } => {
            let partial = read_partial(&file)?;
            if partial.is_empty() {
                println!("No known settings found in {}", file.display());
                return Ok(());
            }
            let count = partial.to_settings().len();
            store.sync_settings(partial);
            println!("Imported {} setting(s) from {}", count, file.display());
            warn_if_memory_only(&store);
        }
        SettingsAction::Reset => {
            store.reset();
            println!("Settings reset to defaults");
            warn_if_memory_only(&store);
        }
        SettingsAction::Path => {
            println!("{}", store.location());
        }
    }
    Ok(())
}

fn handle_models(store: SettingsStore, action: ModelsAction) -> Result<()> {
    match action {
        ModelsAction::List { search } => {
            let list = derive_list(store.custom_models());
            let filtered = filter_list(&list, &search);
            for entry in &filtered {
                let check = if entry.value == store.model() { "✓" } else { " " };
                let custom = if entry.is_custom { " (custom)" } else { "" };
                println!("{} {}{}", check, entry.label, custom);
            }
            if filtered.is_empty() {
                println!("No results found");
            }
            if show_create(&filtered, &search) {
                println!("+ Create \"{}\" with: settings-picker models add \"{}\"", search, search.trim());
            }
        }
        ModelsAction::Add { name } => {
            let mut host = PickerHost::new(store);
            let before = host.store().custom_models().len();
            match host.create(&name) {
                Some(selected) if host.store().custom_models().len() > before => {
                    println!("Added custom model: {}", selected);
                }
                Some(selected) => println!("Selected model: {}", selected),
                None => anyhow::bail!("Model name must not be empty"),
            }
            warn_if_memory_only(host.store());
        }
        ModelsAction::Remove { name } => {
            if !store.custom_models().contains(&name) {
                println!("No custom model named {}", name);
                return Ok(());
            }
            let mut host = PickerHost::new(store);
            let cleared = host.delete(&name).is_some();
            println!("Removed custom model: {}", name);
            if cleared {
                println!("Model selection cleared");
            }
            warn_if_memory_only(host.store());
        }
        ModelsAction::Select { name } => {
            let mut host = PickerHost::new(store);
            match host.select(&name) {
                Some(selected) if selected.is_empty() => println!("Model selection cleared"),
                Some(selected) => println!("Selected model: {}", selected),
                None => {
                    println!("No model named {}", name);
                    println!("Add it with: settings-picker models add \"{}\"", name.trim());
                    return Ok(());
                }
            }
            warn_if_memory_only(host.store());
        }
    }
    Ok(())
}

fn run_picker(store: SettingsStore, width: Option<u16>) -> Result<()> {
    let props = settings_picker::PickerProps {
        width,
        ..Default::default()
    };
    let mut runner = PickerRunner::new(PickerHost::with_props(store, props));
    runner.run()?;

    let host = runner.into_host();
    let model = host.store().model();
    if model.is_empty() {
        println!("No model selected");
    } else {
        println!("Selected model: {}", model);
    }
    Ok(())
}

fn read_partial(file: &Path) -> Result<PartialSettings> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let is_toml = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    PartialSettings::parse(&content, is_toml)
}

fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

fn warn_if_memory_only(store: &SettingsStore) {
    if !store.is_persistent() {
        eprintln!(
            "Warning: could not write {}; changes will be lost on exit",
            store.location()
        );
    }
}
