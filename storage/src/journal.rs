//! Append-only record of committed calls

use crate::error::{Result, StorageError};
use acdm_node::{Call, Receipt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub call: Call,
    pub receipt: Receipt,
    /// Wall-clock time the entry was written, unrelated to `call.timestamp`
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, call: Call, receipt: Receipt) -> &JournalEntry {
        let sequence = self.entries.last().map(|e| e.sequence + 1).unwrap_or(1);
        self.entries.push(JournalEntry {
            sequence,
            call,
            receipt,
            recorded_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Entries whose call came from `caller`.
    pub fn by_caller<'a>(&'a self, caller: &'a str) -> impl Iterator<Item = &'a JournalEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.call.caller.as_str() == caller)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// Load from disk, or start empty if there is no journal yet.
    /// A journal that exists but cannot be read or parsed is an error.
    pub fn load_or_new<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(&path) {
            Ok(journal) => {
                log::debug!("loaded {} journal entries", journal.len());
                Ok(journal)
            }
            Err(StorageError::IoError(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no journal at {}, starting fresh", path.as_ref().display());
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }
}
