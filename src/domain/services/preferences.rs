#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use chrono::SecondsFormat;
use chrono::Utc;

use crate::domain::models::PreferencesExport;
use crate::domain::models::StorageBox;
use crate::domain::models::UserPreferences;
use crate::domain::models::EXPORT_VERSION;

pub const PREFERENCES_KEY: &str = "chatbot-preferences";
pub const SESSIONS_KEY: &str = "chatbot-sessions";

/// User preferences kept in memory and mirrored to durable storage.
pub struct PreferencesStore {
    storage: StorageBox,
    preferences: UserPreferences,
}

impl PreferencesStore {
    /// Reads stored preferences. Missing or unreadable values fall back to
    /// the defaults without failing.
    pub fn load(storage: StorageBox) -> PreferencesStore {
        let preferences = match storage.get(PREFERENCES_KEY) {
            Ok(Some(payload)) => match serde_json::from_str::<UserPreferences>(&payload) {
                Ok(preferences) => preferences,
                Err(err) => {
                    tracing::warn!(error = ?err, "stored preferences are malformed, using defaults");
                    UserPreferences::default()
                }
            },
            Ok(None) => UserPreferences::default(),
            Err(err) => {
                tracing::warn!(error = ?err, "failed to read stored preferences, using defaults");
                UserPreferences::default()
            }
        };

        return PreferencesStore {
            storage,
            preferences,
        };
    }

    pub fn get(&self) -> &UserPreferences {
        return &self.preferences;
    }

    /// Persists before updating memory, so a failed write leaves both as
    /// they were.
    pub fn save(&mut self, preferences: UserPreferences) -> Result<()> {
        let payload = serde_json::to_string(&preferences)?;
        self.storage.set(PREFERENCES_KEY, &payload)?;
        self.preferences = preferences;

        tracing::debug!(preferences = %payload, "saved preferences");
        return Ok(());
    }

    pub fn export_snapshot(&self) -> Result<String> {
        let export = PreferencesExport {
            preferences: self.preferences.clone(),
            export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_VERSION.to_string(),
        };

        return Ok(serde_json::to_string_pretty(&export)?);
    }

    pub fn export_file_name() -> String {
        return format!("chatbot-data-{}.json", Utc::now().format("%Y-%m-%d"));
    }

    /// Writes the export bundle into `dir` and returns the file written.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(PreferencesStore::export_file_name());
        fs::create_dir_all(dir)
            .with_context(|| return format!("Failed to create {}", dir.display()))?;
        fs::write(&path, self.export_snapshot()?)
            .with_context(|| return format!("Failed to write {}", path.display()))?;

        tracing::info!(path = ?path, "exported preferences");
        return Ok(path);
    }

    /// Restores preferences from a bundle produced by `export_snapshot`.
    pub fn import_snapshot(&mut self, payload: &str) -> Result<UserPreferences> {
        let export: PreferencesExport =
            serde_json::from_str(payload).context("Not a valid preferences export")?;
        if export.version != EXPORT_VERSION {
            bail!(
                "Unsupported export version {}, expected {EXPORT_VERSION}",
                export.version
            );
        }

        self.save(export.preferences.clone())?;
        return Ok(export.preferences);
    }

    /// Drops every stored key and resets preferences to their defaults.
    /// Does nothing unless `confirmed`, and reports whether it ran.
    pub fn clear_all(&mut self, confirmed: bool) -> Result<bool> {
        if !confirmed {
            return Ok(false);
        }

        self.storage.remove(PREFERENCES_KEY)?;
        self.storage.remove(SESSIONS_KEY)?;
        self.preferences = UserPreferences::default();

        tracing::info!("cleared all stored data");
        return Ok(true);
    }
}
