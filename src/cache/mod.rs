//! Durable JSON-backed stores for probe results and operator decisions.
//!
//! Three independent key/value stores live under one directory:
//! `probe-cache.json` (fingerprint -> stream inventory), `passed.json`
//! (fingerprint -> passed record) and `skipped.json` (item key -> skip
//! record). Each is a plain pretty-printed JSON object so an operator can
//! delete entries by hand to force re-evaluation; `clear_entry` is the same
//! operation as an API. Entries are never pruned automatically.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use linguarr_probe::StreamInventory;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A file already verified to satisfy the language requirement. Valid only
/// while the item's current fingerprint equals the record's key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassedRecord {
    pub path: PathBuf,
    pub checked_at: DateTime<Utc>,
}

/// An operator's decision to leave a failing item alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipRecord {
    pub title: String,
    pub path: PathBuf,
    pub decided_at: DateTime<Utc>,
}

/// One persisted map. Reads are lock-free-ish (RwLock read); every mutation
/// rewrites the backing file so a crash never loses more than the in-flight
/// update.
pub struct JsonStore<V> {
    path: PathBuf,
    entries: RwLock<HashMap<String, V>>,
}

impl<V: Serialize + DeserializeOwned + Clone> JsonStore<V> {
    /// Open a store, loading existing entries. A missing file is an empty
    /// store; an unreadable one is logged and treated as empty (the file is
    /// only rewritten on the next mutation).
    pub fn open(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("Could not parse {}: {}, starting empty", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!("Could not read {}: {}, starting empty", path.display(), e);
                HashMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn put(&self, key: &str, value: V) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    /// Remove one entry, forcing re-evaluation of that key on the next run.
    pub fn clear_entry(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write();
        let removed = entries.remove(key).is_some();
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write();
        entries.clear();
        self.persist(&entries)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn persist(&self, entries: &HashMap<String, V>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache dir: {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write cache file: {:?}", self.path))?;
        Ok(())
    }
}

/// The three stores the audit loop consults.
pub struct CacheSet {
    pub probe: JsonStore<StreamInventory>,
    pub passed: JsonStore<PassedRecord>,
    pub skip: JsonStore<SkipRecord>,
}

impl CacheSet {
    pub fn open(dir: &Path) -> Self {
        Self {
            probe: JsonStore::open(dir.join("probe-cache.json")),
            passed: JsonStore::open(dir.join("passed.json")),
            skip: JsonStore::open(dir.join("skipped.json")),
        }
    }
}
