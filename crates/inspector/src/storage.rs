//! Shared key-value store between the page session and the companion.
//!
//! Every write is broadcast to subscribers as a [`StoreChange`], including
//! writes made by the subscriber itself.

use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::{debug, warn};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::StoreError;

pub const INSPECT_ENABLED_KEY: &str = "inspectEnabled";
pub const CURRENT_ELEMENT_KEY: &str = "currentElement";
pub const GEMINI_API_KEY: &str = "geminiApiKey";

const CHANGE_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub struct StoreChange {
    pub key: String,
    pub new_value: Value,
}

pub trait SharedStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    /// # Errors
    /// Fails when a persistent store cannot write its backing file.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// `inspectEnabled`, which defaults to on when unset or not a boolean.
pub fn inspect_enabled(store: &dyn SharedStore) -> bool {
    store
        .get(INSPECT_ENABLED_KEY)
        .and_then(|value| value.as_bool())
        .unwrap_or(true)
}

fn notify(sender: &broadcast::Sender<StoreChange>, key: &str, new_value: Value) {
    let change = StoreChange {
        key: key.to_owned(),
        new_value,
    };
    if sender.send(change).is_err() {
        debug!("store change for {key} had no subscribers");
    }
}

/// Process-local store.
#[derive(Debug)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    changes: broadcast::Sender<StoreChange>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            values: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

impl SharedStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.clone());
        notify(&self.changes, key, value);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

/// Store persisted as one JSON object on disk, rewritten on every write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
    changes: broadcast::Sender<StoreChange>,
}

impl JsonFileStore {
    /// `<config dir>/lens/settings.json` for the current user.
    ///
    /// # Errors
    /// Fails when the platform has no config directory.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        dirs::config_dir()
            .map(|dir| dir.join("lens").join("settings.json"))
            .ok_or(StoreError::NoConfigDir)
    }

    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is an error.
    ///
    /// # Errors
    /// Fails on I/O errors other than a missing file, or on malformed JSON.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => match serde_json::from_str::<Value>(&text)? {
                Value::Object(map) => map,
                other => {
                    warn!("ignoring non-object settings in {}: {other}", path.display());
                    Map::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(io_error(&path, source)),
        };
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Ok(Self {
            path,
            values: Mutex::new(values),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
        }
        let text = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, text).map_err(|source| io_error(&self.path, source))
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl SharedStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        {
            let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
            values.insert(key.to_owned(), value.clone());
            self.persist(&values)?;
        }
        notify(&self.changes, key, value);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
