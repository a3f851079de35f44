#[cfg(test)]
#[path = "local_store_test.rs"]
mod tests;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::models::StorageRef;

pub const PROFILE_KEY: &str = "profile";
pub const CHATS_KEY: &str = "chats";

/// Typed JSON access on top of a raw [`crate::domain::models::Storage`].
#[derive(Clone)]
pub struct LocalStore {
    storage: StorageRef,
}

impl LocalStore {
    pub fn new(storage: StorageRef) -> LocalStore {
        return LocalStore { storage };
    }

    /// Returns `None` for missing keys. Unreadable or corrupt entries are
    /// logged and also treated as missing, so callers start from defaults.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = match self.storage.get_item(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!(key, error = ?err, "Failed to read from local store");
                return None;
            }
        };

        match serde_json::from_str::<T>(&payload) {
            Ok(value) => return Some(value),
            Err(err) => {
                tracing::error!(key, error = ?err, "Failed to parse local store entry");
                return None;
            }
        }
    }

    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        self.storage.set_item(key, &payload)?;

        return Ok(());
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        return self.storage.remove_item(key);
    }
}
