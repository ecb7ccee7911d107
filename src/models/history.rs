//! Ordered, bounded history of already-published records.

use std::collections::HashSet;

use crate::models::{Record, RecordKey};

/// Maximum number of records kept between runs.
pub const RETENTION_LIMIT: usize = 250;

/// Newest-first sequence of records with a key index for membership checks.
///
/// The index is derived from `records` on construction and never mutated
/// on its own, so the two cannot drift apart.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<Record>,
    index: HashSet<RecordKey>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from newest-first records.
    ///
    /// When two records share a key, the first (newest) one is kept.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut history = Self::new();
        for record in records {
            if history.index.insert(record.key()) {
                history.records.push(record);
            }
        }
        history
    }

    /// Prepend `newer` records and keep at most `limit` entries.
    pub fn merged(&self, newer: &[Record], limit: usize) -> Self {
        let combined = newer.iter().chain(self.records.iter()).take(limit).cloned();
        Self::from_records(combined)
    }

    /// Whether a record with this key has been seen.
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.index.contains(key)
    }

    /// A copy of the key index, for callers that extend it while scanning.
    pub fn keys(&self) -> HashSet<RecordKey> {
        self.index.clone()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Most recently published record.
    pub fn newest(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PartialEq for History {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for History {}
