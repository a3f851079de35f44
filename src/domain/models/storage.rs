use std::sync::Arc;

use anyhow::Result;

/// String key/value persistence, one entry per logical collection.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;
}

pub type StorageRef = Arc<dyn Storage>;
