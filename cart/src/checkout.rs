//! Session-scoped handoff of the selected lines to the order flow.
//!
//! The cart writes a JSON array of [`CartLine`] snapshots under
//! [`SELECTED_CART_ITEMS_KEY`]; the order page reads it back.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use mosi_api_client::CartLine;
use thiserror::Error;

pub const SELECTED_CART_ITEMS_KEY: &str = "selectedCartItems";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String store scoped to the current browsing session.
pub trait SessionStore: Send + Sync {
    fn put(&self, key: &str, value: &str) -> Result<(), SessionError>;

    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry under a session directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> SessionError + '_ {
    move |source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SessionStore for FileSessionStore {
    fn put(&self, key: &str, value: &str) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(io_error(&path))?;
        tracing::debug!(path = %path.display(), "session entry written");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

pub fn write_selected_items(
    store: &dyn SessionStore,
    lines: &[CartLine],
) -> Result<(), SessionError> {
    let payload = serde_json::to_string(lines)?;
    store.put(SELECTED_CART_ITEMS_KEY, &payload)
}

/// Handed-off lines; empty when nothing was handed off.
pub fn read_selected_items(store: &dyn SessionStore) -> Result<Vec<CartLine>, SessionError> {
    match store.get(SELECTED_CART_ITEMS_KEY)? {
        Some(payload) => Ok(serde_json::from_str(&payload)?),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<CartLine> {
        vec![CartLine {
            product_id: 1,
            option_type: "A".into(),
            product_name: "Trail guide".into(),
            unit_price: 1000,
            quantity: 2,
            available: true,
        }]
    }

    #[test]
    fn memory_store_hands_off_lines() {
        let store = MemorySessionStore::new();

        write_selected_items(&store, &sample()).unwrap_or_else(|e| panic!("write: {e}"));

        let read = read_selected_items(&store).unwrap_or_else(|e| panic!("read: {e}"));
        assert_eq!(read, sample());
    }

    #[test]
    fn payload_uses_server_field_names() {
        let store = MemorySessionStore::new();
        write_selected_items(&store, &sample()).unwrap_or_else(|e| panic!("write: {e}"));

        let raw = store
            .get(SELECTED_CART_ITEMS_KEY)
            .ok()
            .flatten()
            .unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap_or_default();

        assert_eq!(value[0]["productId"], 1);
        assert_eq!(value[0]["optionType"], "A");
        assert_eq!(value[0]["price"], 1000);
    }

    #[test]
    fn missing_entry_reads_as_empty() {
        let store = MemorySessionStore::new();
        let read = read_selected_items(&store).unwrap_or_else(|e| panic!("read: {e}"));
        assert!(read.is_empty());
    }

    #[test]
    fn file_store_creates_directory_and_removes() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = FileSessionStore::new(tmp.path().join("session"));

        write_selected_items(&store, &sample()).unwrap_or_else(|e| panic!("write: {e}"));
        assert!(tmp.path().join("session/selectedCartItems.json").exists());
        assert_eq!(
            read_selected_items(&store).unwrap_or_else(|e| panic!("read: {e}")),
            sample()
        );

        store
            .remove(SELECTED_CART_ITEMS_KEY)
            .unwrap_or_else(|e| panic!("remove: {e}"));
        store
            .remove(SELECTED_CART_ITEMS_KEY)
            .unwrap_or_else(|e| panic!("second remove: {e}"));
        assert_eq!(store.get(SELECTED_CART_ITEMS_KEY).ok().flatten(), None);
    }

    #[test]
    fn corrupt_payload_is_json_error() {
        let store = MemorySessionStore::new();
        store
            .put(SELECTED_CART_ITEMS_KEY, "[{")
            .unwrap_or_else(|e| panic!("put: {e}"));

        assert!(matches!(
            read_selected_items(&store),
            Err(SessionError::Json(_))
        ));
    }
}
