pub mod file;
#[cfg(test)]
pub mod memory;

use std::path::PathBuf;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::StorageBox;

pub struct StorageManager {}

impl StorageManager {
    pub fn get() -> Result<StorageBox> {
        let dir = PathBuf::from(Config::get(ConfigKey::DataDir));
        return Ok(Box::new(file::FileStorage::new(dir)));
    }
}
