use anyhow::Result;

use super::PreferencesStore;
use super::PREFERENCES_KEY;
use super::SESSIONS_KEY;
use crate::domain::models::FontSize;
use crate::domain::models::PreferencesExport;
use crate::domain::models::Theme;
use crate::domain::models::UserPreferences;
use crate::infrastructure::storage::memory::MemoryStorage;

fn dark() -> UserPreferences {
    return UserPreferences {
        theme: Theme::Dark,
        notifications: false,
        font_size: FontSize::Large,
        language: "es".to_string(),
    };
}

#[test]
fn it_loads_defaults_when_empty() {
    let store = PreferencesStore::load(Box::<MemoryStorage>::default());
    assert_eq!(store.get(), &UserPreferences::default());
}

#[test]
fn it_loads_stored_preferences() {
    let storage = MemoryStorage::with(
        PREFERENCES_KEY,
        r#"{"theme":"dark","notifications":false,"fontSize":"large","language":"es"}"#,
    );
    let store = PreferencesStore::load(Box::new(storage));

    assert_eq!(store.get(), &dark());
}

#[test]
fn it_falls_back_to_defaults_when_malformed() {
    let storage = MemoryStorage::with(PREFERENCES_KEY, r#"{"theme":"sepia"}"#);
    let store = PreferencesStore::load(Box::new(storage));

    assert_eq!(store.get(), &UserPreferences::default());
}

#[test]
fn it_saves_preferences() -> Result<()> {
    let mut store = PreferencesStore::load(Box::<MemoryStorage>::default());
    store.save(dark())?;

    assert_eq!(store.get(), &dark());
    return Ok(());
}

#[test]
fn it_keeps_memory_when_saving_fails() {
    let storage = MemoryStorage {
        failing: true,
        ..MemoryStorage::default()
    };
    let mut store = PreferencesStore::load(Box::new(storage));

    assert!(store.save(dark()).is_err());
    assert_eq!(store.get(), &UserPreferences::default());
}

#[test]
fn it_exports_and_imports_snapshots() -> Result<()> {
    let mut store = PreferencesStore::load(Box::<MemoryStorage>::default());
    store.save(dark())?;

    let snapshot = store.export_snapshot()?;
    let export: PreferencesExport = serde_json::from_str(&snapshot)?;
    assert_eq!(export.version, "1.0");
    assert_eq!(export.preferences, dark());
    assert!(snapshot.contains("\"exportDate\""));
    assert!(snapshot.contains("\"fontSize\": \"large\""));

    let mut other = PreferencesStore::load(Box::<MemoryStorage>::default());
    let imported = other.import_snapshot(&snapshot)?;
    assert_eq!(imported, dark());
    assert_eq!(other.get(), &dark());

    return Ok(());
}

#[test]
fn it_rejects_unknown_export_versions() {
    let mut store = PreferencesStore::load(Box::<MemoryStorage>::default());
    let payload = r#"{"preferences":{"theme":"dark","notifications":true,"fontSize":"small","language":"en"},"exportDate":"2024-01-01T00:00:00.000Z","version":"2.0"}"#;

    assert!(store.import_snapshot(payload).is_err());
    assert!(store.import_snapshot("[]").is_err());
    assert_eq!(store.get(), &UserPreferences::default());
}

#[test]
fn it_exports_to_dated_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = PreferencesStore::load(Box::<MemoryStorage>::default());

    let path = store.export_to_dir(dir.path())?;

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("chatbot-data-"));
    assert!(name.ends_with(".json"));
    assert_eq!(name.len(), "chatbot-data-2024-01-01.json".len());
    assert!(std::fs::read_to_string(&path)?.contains("\"version\": \"1.0\""));

    return Ok(());
}

#[test]
fn it_only_clears_when_confirmed() -> Result<()> {
    let mut storage = MemoryStorage::with(SESSIONS_KEY, "[]");
    storage
        .values
        .insert(PREFERENCES_KEY.to_string(), serde_json::to_string(&dark())?);
    let mut store = PreferencesStore::load(Box::new(storage));

    assert!(!store.clear_all(false)?);
    assert_eq!(store.get(), &dark());

    assert!(store.clear_all(true)?);
    assert_eq!(store.get(), &UserPreferences::default());

    let reloaded = PreferencesStore::load(store.storage);
    assert_eq!(reloaded.get(), &UserPreferences::default());

    return Ok(());
}
