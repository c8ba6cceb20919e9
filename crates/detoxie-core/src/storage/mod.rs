mod config;
pub mod database;
pub mod keys;

pub use config::{Config, ConfigProvider, FileConfigProvider, OverlayConfig};
pub use database::Database;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{ConfigError, StoreError};

/// Returns the data directory, creating it if needed.
///
/// `DETOXIE_DATA_DIR` wins when set. Otherwise `~/.config/detoxie[-dev]/`
/// based on `DETOXIE_ENV` (set it to `dev` for a development data directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DETOXIE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DETOXIE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("detoxie-dev")
            } else {
                base_dir.join("detoxie")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Durable string key-value store.
///
/// The tracker only ever reads and writes through this trait, so any host
/// store (SQLite, platform preferences, memory) can back it.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write several keys together. Stores that can commit atomically should.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// In-process store. Nothing survives the process, but the tracker can't
/// tell the difference.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        (**self).set_many(entries)
    }
}
