#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::path;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::Storage;

/// Stores each key as `{key}.json` inside a data directory. Writes replace
/// the whole file; the last writer wins.
pub struct FileStorage {
    data_dir: path::PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: path::PathBuf) -> FileStorage {
        return FileStorage { data_dir };
    }

    fn file_path(&self, key: &str) -> Result<path::PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| return c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!(format!("Invalid storage key: {key}"));
        }

        return Ok(self.data_dir.join(format!("{key}.json")));
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.file_path(key)?;
        if !file_path.exists() {
            return Ok(None);
        }

        return Ok(Some(fs::read_to_string(file_path)?));
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.file_path(key)?;
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }

        // Replaced atomically through a temporary sibling.
        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(tmp_path, file_path)?;

        return Ok(());
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let file_path = self.file_path(key)?;
        if !file_path.exists() {
            return Ok(());
        }

        fs::remove_file(file_path)?;
        return Ok(());
    }
}
