//! Storage abstractions for the sync history.
//!
//! The history is the only state carried between runs. The feed is derived
//! from it and can always be regenerated.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── config.toml               # Harvester configuration
//! ├── processed_documents.json  # History: newest-first, at most 250 entries
//! └── feed.xml                  # Derived RSS output
//! ```
//!
//! A run assumes exclusive access to the data directory. No file locking
//! is performed; overlapping runs must be prevented by the scheduler.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::History;

// Re-export for convenience
pub use local::LocalHistoryStore;

/// Trait for history storage backends.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the persisted history.
    ///
    /// Never fails: missing or unreadable state yields an empty history.
    async fn load(&self) -> History;

    /// Persist the history, replacing whatever was stored before.
    ///
    /// Fails with [`AppError::Persistence`](crate::error::AppError::Persistence)
    /// if the medium cannot be written.
    async fn save(&self, history: &History) -> Result<()>;
}
