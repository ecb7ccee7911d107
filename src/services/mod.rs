//! Collaborators of the sync engine: the paginated portal listing and the
//! feed output.

pub mod feed;
pub mod portal;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Page, Record};

pub use feed::RssFeedWriter;
pub use portal::PortalClient;

/// A paginated listing sorted newest-first.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page by zero-based index.
    ///
    /// Past the last page this returns an empty [`Page`], not an error.
    /// Non-success responses and transport failures are errors.
    async fn fetch(&self, page_index: usize) -> Result<Page>;
}

/// Renders an ordered record list, most recent first.
#[async_trait]
pub trait FeedPublisher: Send + Sync {
    async fn publish(&self, records: &[Record]) -> Result<()>;
}
