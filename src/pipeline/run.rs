// src/pipeline/run.rs

//! One harvesting run: sync, persist, publish.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::sync::{StopReason, SyncEngine};
use crate::services::{FeedPublisher, PageSource};
use crate::storage::HistoryStore;

/// Summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub pages_requested: usize,
    pub stop: StopReason,
    pub new_count: usize,
    pub retained_count: usize,
    /// Whether the history was written
    pub saved: bool,
    /// Whether the feed was written
    pub published: bool,
}

/// Run the harvester once.
///
/// The feed is only written after the history has been saved, and only when
/// there is something to show.
pub async fn run_sync(
    config: &Config,
    source: &dyn PageSource,
    store: &dyn HistoryStore,
    publisher: &dyn FeedPublisher,
) -> Result<RunReport> {
    let start_time = Utc::now();
    log::info!(
        "Starting sync (max {} pages, retention {})",
        config.sync.max_pages,
        config.sync.retention_limit
    );

    let engine = SyncEngine::from_config(&config.sync);
    let outcome = engine.run(source, store).await?;

    let records = outcome.records_to_publish();
    let published = if records.is_empty() {
        log::info!("Nothing to publish, feed left as is");
        false
    } else {
        publisher.publish(records).await?;
        true
    };

    let report = RunReport {
        start_time,
        end_time: Utc::now(),
        pages_requested: outcome.pages_requested,
        stop: outcome.stop,
        new_count: outcome.new_records.len(),
        retained_count: outcome.history.len(),
        saved: !outcome.is_aborted(),
        published,
    };

    log::info!(
        "Sync complete: {} new, {} retained, {} page request(s)",
        report.new_count,
        report.retained_count,
        report.pages_requested
    );

    Ok(report)
}

/// Regenerate the feed from stored history without contacting the portal.
///
/// Returns the number of items written.
pub async fn run_render(store: &dyn HistoryStore, publisher: &dyn FeedPublisher) -> Result<usize> {
    let history = store.load().await;
    if history.is_empty() {
        log::warn!("History is empty, no feed written");
        return Ok(0);
    }

    publisher.publish(history.records()).await?;
    Ok(history.len())
}
