//! On-disk save file.
//!
//! The file is one JSON object mapping each persisted key to its string
//! value, matching the flat layout the engine codec reads and writes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chipdeck_engine::codec::{self, KeyValueStore};
use chipdeck_engine::state::GameState;
use serde_json::Value;

use crate::error::CliError;
use crate::io_utils::{read_text_auto, write_text_atomic};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`, or starts empty when it does not exist yet. Non-string
    /// values are kept as their JSON text so the codec can still decode
    /// hand-edited files.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CliError> {
        let path = path.into();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no save file, starting fresh");
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }
        let text = read_text_auto(&path)?;
        let raw: BTreeMap<String, Value> = serde_json::from_str(&text).map_err(|e| {
            CliError::Store(format!("{} is not a JSON object: {}", path.display(), e))
        })?;
        let entries = raw
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect();
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn load_state(&self) -> GameState {
        codec::load_state(self)
    }

    pub fn persist(&self) -> Result<(), CliError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        write_text_atomic(&self.path, &text)?;
        tracing::debug!(path = %self.path.display(), keys = self.entries.len(), "save file written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}
