#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;

use crate::domain::models::Storage;

/// Keeps each key as `<dir>/<key>.json`. Writes go through a temporary file
/// and a rename so a crash never leaves a half written document behind.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> FileStorage {
        return FileStorage { dir };
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| return c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            bail!("Invalid storage key: {key:?}");
        }

        return Ok(self.dir.join(format!("{key}.json")));
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| return format!("Failed to read {}", path.display()))?;
        return Ok(Some(contents));
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| return format!("Failed to create {}", self.dir.display()))?;

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path)
                .with_context(|| return format!("Failed to create {}", tmp_path.display()))?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }

        if let Err(err) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err).with_context(|| return format!("Failed to write {}", path.display()));
        }

        tracing::debug!(key, path = ?path, "stored document");
        return Ok(());
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| return format!("Failed to remove {}", path.display()))?;
        }

        return Ok(());
    }
}
