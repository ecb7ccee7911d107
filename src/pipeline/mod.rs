//! Pipeline entry points for harvester operations.
//!
//! - `run_sync`: Fetch new disclosures, update history, publish the feed
//! - `run_render`: Rebuild the feed from stored history

pub mod run;
pub mod sync;

pub use run::{RunReport, run_render, run_sync};
pub use sync::{StopReason, SyncEngine, SyncOutcome};
