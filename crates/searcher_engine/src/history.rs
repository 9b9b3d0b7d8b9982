use std::path::PathBuf;

use engine_logging::{engine_info, engine_warn};

use crate::persist::{JsonFileStore, PersistError};

pub const HISTORY_KEY: &str = "search_history";

/// Query history kept as one JSON array under a fixed key.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    store: JsonFileStore,
}

impl HistoryStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            store: JsonFileStore::new(dir),
        }
    }

    /// Reads the whole list. Missing, unreadable or malformed data reads as empty.
    pub fn load(&self) -> Vec<String> {
        let raw = match self.store.read(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                engine_warn!(
                    "Failed to read search history from {:?}: {}",
                    self.store.dir(),
                    err
                );
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(entries) => {
                engine_info!("Loaded {} history entries", entries.len());
                entries
            }
            Err(err) => {
                engine_warn!("Ignoring malformed search history: {}", err);
                Vec::new()
            }
        }
    }

    /// Replaces the stored list.
    pub fn save(&self, entries: &[String]) -> Result<(), PersistError> {
        let json = serde_json::to_string(entries)?;
        self.store.write(HISTORY_KEY, &json)?;
        Ok(())
    }
}
