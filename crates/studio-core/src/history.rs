//! Saved generations, newest first.
//!
//! The whole list lives under one storage key as a JSON array and is
//! rewritten on every append. Reading never fails: anything unreadable is
//! treated as an empty history.

use crate::storage::KeyValueStore;
use crate::SavedEntry;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key for the history list.
pub const HISTORY_KEY: &str = "aiHistory";

/// Append-only history backed by a [`KeyValueStore`].
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<SavedEntry>,
}

impl HistoryStore {
    /// Open the store and load whatever history it holds.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let mut history = Self {
            store,
            entries: Vec::new(),
        };
        history.entries = history.load();
        history
    }

    /// Read the persisted list.
    ///
    /// Missing keys, unreadable storage, invalid JSON and non-array values
    /// all yield an empty list. Array items that are not entries are skipped.
    pub fn load(&self) -> Vec<SavedEntry> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read history: {}", e);
                return Vec::new();
            }
        };

        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!("Stored history is not an array, ignoring it");
                return Vec::new();
            }
            Err(e) => {
                warn!("Stored history is not valid JSON, ignoring it: {}", e);
                return Vec::new();
            }
        };

        let total = items.len();
        let entries: Vec<SavedEntry> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if entries.len() != total {
            warn!("Skipped {} malformed history item(s)", total - entries.len());
        }
        debug!("Loaded {} history entries", entries.len());
        entries
    }

    /// Prepend `entry`, persist the whole list and return it.
    ///
    /// A failed write is logged and otherwise ignored; the in-memory list is
    /// updated regardless.
    pub fn append(&mut self, entry: SavedEntry) -> &[SavedEntry] {
        self.entries.insert(0, entry);
        if let Err(e) = self.persist() {
            warn!("Failed to persist history: {}", e);
        }
        &self.entries
    }

    pub fn entries(&self) -> &[SavedEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&SavedEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> crate::Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &json)
    }
}
