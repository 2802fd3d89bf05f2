use std::collections::HashMap;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::Storage;

/// In-memory storage for tests. `failing` makes every write error out.
#[derive(Default)]
pub struct MemoryStorage {
    pub values: HashMap<String, String>,
    pub failing: bool,
}

impl MemoryStorage {
    pub fn with(key: &str, value: &str) -> MemoryStorage {
        let mut storage = MemoryStorage::default();
        storage.values.insert(key.to_string(), value.to_string());
        return storage;
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.values.get(key).cloned());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.failing {
            bail!("storage unavailable");
        }
        self.values.insert(key.to_string(), value.to_string());
        return Ok(());
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.failing {
            bail!("storage unavailable");
        }
        self.values.remove(key);
        return Ok(());
    }
}
