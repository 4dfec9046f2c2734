use anyhow::Result;
use assert_fs::TempDir;
use serial_test::serial;
use settings_picker::config::{self, HOME_ENV};
use settings_picker::store::{FileStorage, LoadOutcome, SettingsStore};
use settings_picker::Setting;

#[test]
#[serial]
fn test_storage_dir_from_env() -> Result<()> {
    let home = TempDir::new()?;
    std::env::set_var(HOME_ENV, home.path());

    let dir = config::storage_dir(None)?;
    std::env::remove_var(HOME_ENV);

    assert_eq!(dir, home.path());
    Ok(())
}

#[test]
#[serial]
fn test_explicit_dir_beats_env() -> Result<()> {
    let home = TempDir::new()?;
    let explicit = TempDir::new()?;
    std::env::set_var(HOME_ENV, home.path());

    let dir = config::storage_dir(Some(explicit.path().to_path_buf()))?;
    std::env::remove_var(HOME_ENV);

    assert_eq!(dir, explicit.path());
    Ok(())
}

#[test]
#[serial]
fn test_store_opened_from_env_dir_persists() -> Result<()> {
    let home = TempDir::new()?;
    std::env::set_var(HOME_ENV, home.path());
    let dir = config::storage_dir(None)?;
    std::env::remove_var(HOME_ENV);

    let mut store = SettingsStore::open(FileStorage::new(&dir));
    assert_eq!(store.load_outcome(), &LoadOutcome::Defaults);
    store.update_setting(Setting::CustomPrompt("explain tradeoffs".into()));

    assert!(home.path().join(config::record_file_name()).exists());
    let reopened = SettingsStore::open(FileStorage::new(&dir));
    assert_eq!(reopened.settings().custom_prompt, "explain tradeoffs");
    Ok(())
}
