use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, VocabError};

pub const WEIGHTS_KEY: &str = "word_weights";
pub const HISTORY_KEY: &str = "word_history";
pub const SCORES_KEY: &str = "top_score";
pub const SESSION_KEY: &str = "current_session";
pub const CACHE_KEY: &str = "translation_cache";
pub const EXPORT_PREFIX: &str = "export_";

const OWNED_KEYS: [&str; 5] = [WEIGHTS_KEY, HISTORY_KEY, SCORES_KEY, SESSION_KEY, CACHE_KEY];

/// Flat JSON files in one directory, one file per key.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// `Ok(None)` when the file does not exist.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(VocabError::Persistence(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            }
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            VocabError::Persistence(format!("corrupt file {}: {e}", path.display()))
        })
    }

    /// Missing or unreadable data yields the default value.
    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => {
                debug!(key = key, "Loaded stored state");
                value
            }
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key = key, error = %e, "Falling back to default state");
                T::default()
            }
        }
    }

    /// Writes to a temporary file and renames it over the target.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let data = serde_json::to_vec_pretty(value)?;
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        debug!(key = key, path = %path.display(), "Saved state");
        Ok(())
    }

    pub fn save_as<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        Ok(path)
    }

    /// Removes the file for `key`; `Ok(false)` when there was none.
    pub fn remove(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the files this store owns: every known state key and the
    /// `export_*.json` files. Anything else in the directory is left alone.
    /// Returns how many files were removed.
    pub fn remove_all(&self) -> Result<usize> {
        let mut removed = 0;
        for key in OWNED_KEYS {
            if self.remove(key)? {
                removed += 1;
            }
        }

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
            Err(e) => return Err(e.into()),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_export_file(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Could not remove file"),
            }
        }
        Ok(removed)
    }
}

fn is_export_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(EXPORT_PREFIX) && n.ends_with(".json"))
}
