//! history.rs — persisted research log.
//!
//! The whole log lives in memory behind a mutex and is mirrored to a single
//! JSON array file, rewritten in full on every append (temp file + rename).
//! Appends are serialized by a separate writer lock, so ids never collide and
//! files land in append order; readers only wait for the in-memory push.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::research::{unix_now, ResultItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub timestamp: f64,
    pub result_count: usize,
    pub results: Vec<ResultItem>,
}

/// What a caller supplies; id, timestamp and count are filled in on append.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub topic: String,
    pub prompt: Option<String>,
    pub results: Vec<ResultItem>,
}

#[derive(Debug)]
pub struct HistoryStore {
    inner: Mutex<Vec<HistoryEntry>>,
    writer: Mutex<()>,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Store without a file mirror (tests, demos).
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            writer: Mutex::new(()),
            path: None,
        }
    }

    /// Load `path` if it exists. An unreadable or malformed file starts an empty log.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            match load_entries(&path) {
                Ok(v) => {
                    info!(path = %path.display(), entries = v.len(), "history loaded");
                    v
                }
                Err(e) => {
                    warn!(path = %path.display(), error = ?e, "history unreadable, starting empty");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Self {
            inner: Mutex::new(entries),
            writer: Mutex::new(()),
            path: Some(path),
        }
    }

    /// Append under the writer lock: assign id, push, persist a snapshot. If
    /// persisting fails the entry is removed again and the error returned.
    pub fn append(&self, new: NewEntry) -> Result<HistoryEntry> {
        let _writer = lock_unpoisoned(&self.writer);

        let (entry, snapshot) = {
            let mut log = self.lock();
            let id = log.iter().map(|e| e.id).max().unwrap_or(0) + 1;
            let entry = HistoryEntry {
                id,
                topic: new.topic,
                prompt: new.prompt,
                timestamp: unix_now(),
                result_count: new.results.len(),
                results: new.results,
            };
            log.push(entry.clone());
            let snapshot = self.path.as_ref().map(|_| log.clone());
            (entry, snapshot)
        };

        if let (Some(path), Some(snapshot)) = (&self.path, snapshot) {
            if let Err(e) = persist(path, &snapshot) {
                self.lock().retain(|e| e.id != entry.id);
                return Err(e);
            }
        }

        counter!("history_appends_total").increment(1);
        Ok(entry)
    }

    pub fn all(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    pub fn get(&self, id: u64) -> Option<HistoryEntry> {
        self.lock().iter().find(|e| e.id == id).cloned()
    }

    /// Distinct topics, in no particular order.
    pub fn topics(&self) -> Vec<String> {
        let log = self.lock();
        let set: HashSet<&str> = log.iter().map(|e| e.topic.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        lock_unpoisoned(&self.inner)
    }
}

// A panic mid-append cannot leave a half-written entry, so a poisoned
// lock still guards a consistent log.
fn lock_unpoisoned<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poison) => poison.into_inner(),
    }
}

fn load_entries(path: &Path) -> Result<Vec<HistoryEntry>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading history from {}", path.display()))?;
    let entries = serde_json::from_str(&data)
        .with_context(|| format!("parsing history in {}", path.display()))?;
    Ok(entries)
}

fn persist(path: &Path, log: &[HistoryEntry]) -> Result<()> {
    let json = serde_json::to_vec(log).context("serializing history")?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating history dir {}", dir.display()))?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, json).with_context(|| format!("writing history to {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| {
        let _ = fs::remove_file(&tmp);
        format!("replacing history at {}", path.display())
    })
}

/// Sibling of `path` used for the write-then-rename swap.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
