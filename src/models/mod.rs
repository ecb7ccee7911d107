// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod history;
mod page;
mod record;

// Re-export all public types
pub use config::{Config, FeedConfig, SourceConfig, StorageConfig, SyncConfig};
pub use history::{History, RETENTION_LIMIT};
pub use page::{Page, PageRequest};
pub use record::{DocumentPayload, Record, RecordKey, StoredTuple, UNTITLED};
