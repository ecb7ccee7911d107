//! Local filesystem history store.
//!
//! ## Format
//!
//! A JSON array of `[id, disclosureDate, disclosureType, title]` arrays,
//! newest-first:
//!
//! ```text
//! [
//!   ["100123", "2025-06-02", "PARTIAL", "Minutes of the meeting"],
//!   ["100118", "2025-06-01", "FULL_ACCESS", "Briefing note"]
//! ]
//! ```
//!
//! Older files with 3-element entries or full portal document objects are
//! still readable and are rewritten in the tuple form on the next save.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{History, RETENTION_LIMIT, Record, StoredTuple};
use crate::storage::HistoryStore;
use crate::utils::fs::{read_optional, write_atomic};

/// JSON file history store.
#[derive(Debug, Clone)]
pub struct LocalHistoryStore {
    path: PathBuf,
    retention_limit: usize,
}

impl LocalHistoryStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention_limit: RETENTION_LIMIT,
        }
    }

    /// Override the maximum number of entries written, up to [`RETENTION_LIMIT`].
    pub fn with_retention_limit(mut self, limit: usize) -> Self {
        self.retention_limit = limit.min(RETENTION_LIMIT);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode history bytes, dropping entries that cannot be read.
    fn decode(bytes: &[u8]) -> Result<History> {
        let entries: Vec<Value> = serde_json::from_slice(bytes)?;
        let total = entries.len();

        let records: Vec<Record> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match Record::from_stored(entry) {
                Ok(record) => Some(record),
                Err(reason) => {
                    log::warn!("Dropping history entry {}: {}", i, reason);
                    None
                }
            })
            .collect();

        if records.len() < total {
            log::warn!("Kept {} of {} history entries", records.len(), total);
        }

        Ok(History::from_records(records))
    }

    /// Encode history in the tuple form.
    fn encode(&self, history: &History) -> Result<Vec<u8>> {
        let tuples: Vec<StoredTuple> = history
            .records()
            .iter()
            .take(self.retention_limit)
            .map(Record::to_stored)
            .collect();
        Ok(serde_json::to_vec_pretty(&tuples)?)
    }

    async fn try_load(&self) -> Result<Option<History>> {
        match read_optional(&self.path).await? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl HistoryStore for LocalHistoryStore {
    async fn load(&self) -> History {
        match self.try_load().await {
            Ok(Some(history)) => {
                log::info!(
                    "Loaded {} history entries from {}",
                    history.len(),
                    self.path.display()
                );
                history
            }
            Ok(None) => {
                log::info!("No history at {}, starting fresh", self.path.display());
                History::new()
            }
            Err(e) => {
                log::warn!(
                    "History at {} is unreadable ({}), starting fresh",
                    self.path.display(),
                    e
                );
                History::new()
            }
        }
    }

    async fn save(&self, history: &History) -> Result<()> {
        let bytes = self
            .encode(history)
            .map_err(|e| AppError::persistence(&self.path, e))?;
        write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| AppError::persistence(&self.path, e))?;

        log::info!(
            "Saved {} history entries to {}",
            history.len().min(self.retention_limit),
            self.path.display()
        );
        Ok(())
    }
}
