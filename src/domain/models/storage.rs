use anyhow::Result;

/// Durable key-value storage for small JSON documents, the terminal
/// counterpart of a browser's local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Commits `value` before returning.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub type StorageBox = Box<dyn Storage + Send>;
