//! Incremental sync against the portal listing.
//!
//! The listing is sorted newest-first, so the first record already in the
//! history marks the point where this run catches up with the previous one.
//! Everything before it is new; everything after it was seen before.

use serde::Serialize;

use crate::error::Result;
use crate::models::{History, RETENTION_LIMIT, Record, SyncConfig};
use crate::services::PageSource;
use crate::storage::HistoryStore;

/// Why paging ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// A page came back with no entries at all
    Exhausted,
    /// A record already in the history was found
    ReachedSeen { page: usize, position: usize },
    /// The page ceiling was hit
    PageLimit,
    /// A page request failed
    FetchFailed { page: usize },
}

/// Result of one sync pass.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Records not seen before, newest-first
    pub new_records: Vec<Record>,
    /// Retained window after merging and truncation
    pub history: History,
    /// Number of page requests issued, including a failed one
    pub pages_requested: usize,
    pub stop: StopReason,
}

impl SyncOutcome {
    /// The very first page failed; nothing should be written or published.
    pub fn is_aborted(&self) -> bool {
        matches!(self.stop, StopReason::FetchFailed { page: 0 })
    }

    /// Records to hand to the feed: the whole retained window.
    pub fn records_to_publish(&self) -> &[Record] {
        if self.is_aborted() {
            &[]
        } else {
            self.history.records()
        }
    }
}

/// Walks listing pages and merges unseen records into the history.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    max_pages: usize,
    retention_limit: usize,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(5, RETENTION_LIMIT)
    }
}

impl SyncEngine {
    /// Create an engine with an explicit page ceiling and retention bound.
    ///
    /// The bound is capped at [`RETENTION_LIMIT`].
    pub fn new(max_pages: usize, retention_limit: usize) -> Self {
        Self {
            max_pages,
            retention_limit: retention_limit.min(RETENTION_LIMIT),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.max_pages, config.retention_limit)
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Collect unseen records and compute the updated history.
    ///
    /// Fetch failures end paging but are not errors: whatever was collected
    /// before the failure is kept. A failure on page 0 leaves the history
    /// untouched.
    pub async fn sync(&self, source: &dyn PageSource, history: &History) -> SyncOutcome {
        let mut seen = history.keys();
        let mut new_records = Vec::new();
        let mut pages_requested = 0;
        let mut stop = StopReason::PageLimit;

        'pages: for page_index in 0..self.max_pages {
            pages_requested += 1;

            let page = match source.fetch(page_index).await {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Stopping at page {}: {}", page_index, e);
                    stop = StopReason::FetchFailed { page: page_index };
                    break;
                }
            };

            if page.is_exhausted() {
                log::debug!("Page {} returned no entries, listing exhausted", page_index);
                stop = StopReason::Exhausted;
                break;
            }

            for (position, record) in page.records.into_iter().enumerate() {
                if !seen.insert(record.key()) {
                    log::debug!(
                        "Record {} at page {} position {} already seen",
                        record.id,
                        page_index,
                        position
                    );
                    stop = StopReason::ReachedSeen {
                        page: page_index,
                        position,
                    };
                    break 'pages;
                }
                new_records.push(record);
            }
        }

        let history = if matches!(stop, StopReason::FetchFailed { page: 0 }) {
            history.clone()
        } else {
            history.merged(&new_records, self.retention_limit)
        };

        log::info!(
            "Sync stopped ({:?}) after {} page request(s): {} new, {} retained",
            stop,
            pages_requested,
            new_records.len(),
            history.len()
        );

        SyncOutcome {
            new_records,
            history,
            pages_requested,
            stop,
        }
    }

    /// Load the history, sync, and persist the result.
    ///
    /// A save failure is returned as an error so the run does not report
    /// success with records that would be announced again next time.
    pub async fn run(
        &self,
        source: &dyn PageSource,
        store: &dyn HistoryStore,
    ) -> Result<SyncOutcome> {
        let history = store.load().await;
        let outcome = self.sync(source, &history).await;

        if outcome.is_aborted() {
            log::warn!("First page failed, history left unchanged");
        } else {
            store.save(&outcome.history).await?;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::AppError;
    use crate::models::Page;

    /// Serves scripted pages and records which indices were requested.
    struct ScriptedSource {
        pages: Vec<std::result::Result<Vec<Record>, u16>>,
        requested: Mutex<Vec<usize>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<std::result::Result<Vec<Record>, u16>>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<usize> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch(&self, page_index: usize) -> Result<Page> {
            self.requested.lock().unwrap().push(page_index);
            match self.pages.get(page_index) {
                Some(Ok(records)) => Ok(Page::new(page_index, records.clone())),
                Some(Err(status)) => Err(AppError::fetch(page_index, format!("HTTP status {status}"))),
                None => Ok(Page::new(page_index, Vec::new())),
            }
        }
    }

    fn make_record(id: &str) -> Record {
        Record::new(id, "2025-06-01", "PARTIAL", format!("Document {id}"))
    }

    fn make_records(prefix: &str, count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| make_record(&format!("{prefix}{i}")))
            .collect()
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_cold_start_single_page() {
        let source = ScriptedSource::new(vec![Ok(make_records("n", 3))]);
        let outcome = SyncEngine::default().sync(&source, &History::new()).await;

        assert_eq!(ids(&outcome.new_records), vec!["n0", "n1", "n2"]);
        assert_eq!(outcome.history.len(), 3);
        assert_eq!(outcome.stop, StopReason::Exhausted);
        assert_eq!(source.requested(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_full_history_is_truncated() {
        let old = History::from_records(make_records("old", RETENTION_LIMIT));
        let source = ScriptedSource::new(vec![Ok(make_records("new", 5)), Ok(Vec::new())]);

        let outcome = SyncEngine::default().sync(&source, &old).await;

        assert_eq!(outcome.new_records.len(), 5);
        assert_eq!(outcome.history.len(), RETENTION_LIMIT);
        assert_eq!(&outcome.history.records()[..5], &outcome.new_records[..]);
        assert_eq!(
            &outcome.history.records()[5..],
            &old.records()[..RETENTION_LIMIT - 5]
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_seen_record() {
        let known = make_record("k");
        let history = History::from_records(vec![known.clone(), make_record("older")]);
        let source = ScriptedSource::new(vec![
            Ok(vec![make_record("new1"), make_record("new2"), known, make_record("old3")]),
            Ok(make_records("never", 2)),
        ]);

        let outcome = SyncEngine::default().sync(&source, &history).await;

        assert_eq!(ids(&outcome.new_records), vec!["new1", "new2"]);
        assert_eq!(outcome.stop, StopReason::ReachedSeen { page: 0, position: 2 });
        assert_eq!(source.requested(), vec![0]);
        assert_eq!(ids(outcome.history.records()), vec!["new1", "new2", "k", "older"]);
    }

    #[tokio::test]
    async fn test_early_stop_on_later_page() {
        let known = make_record("k");
        let history = History::from_records(vec![known.clone()]);
        let source = ScriptedSource::new(vec![
            Ok(make_records("p0_", 3)),
            Ok(vec![make_record("p1_0"), known, make_record("p1_2")]),
            Ok(make_records("p2_", 3)),
        ]);

        let outcome = SyncEngine::default().sync(&source, &history).await;

        assert_eq!(
            ids(&outcome.new_records),
            vec!["p0_0", "p0_1", "p0_2", "p1_0"]
        );
        assert_eq!(source.requested(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_first_page_failure_leaves_history() {
        let history = History::from_records(make_records("old", 4));
        let source = ScriptedSource::new(vec![Err(503)]);

        let outcome = SyncEngine::default().sync(&source, &history).await;

        assert!(outcome.is_aborted());
        assert!(outcome.new_records.is_empty());
        assert!(outcome.records_to_publish().is_empty());
        assert_eq!(outcome.history, history);
    }

    #[tokio::test]
    async fn test_later_failure_keeps_partial_progress() {
        let history = History::from_records(make_records("old", 2));
        let source = ScriptedSource::new(vec![Ok(make_records("new", 2)), Err(500)]);

        let outcome = SyncEngine::default().sync(&source, &history).await;

        assert!(!outcome.is_aborted());
        assert_eq!(outcome.stop, StopReason::FetchFailed { page: 1 });
        assert_eq!(ids(outcome.records_to_publish()), vec!["new0", "new1", "old0", "old1"]);
    }

    #[tokio::test]
    async fn test_page_ceiling() {
        let pages = (0..10).map(|p| Ok(make_records(&format!("p{p}_"), 2))).collect();
        let source = ScriptedSource::new(pages);

        let outcome = SyncEngine::new(3, RETENTION_LIMIT)
            .sync(&source, &History::new())
            .await;

        assert_eq!(outcome.stop, StopReason::PageLimit);
        assert_eq!(source.requested(), vec![0, 1, 2]);
        assert_eq!(outcome.new_records.len(), 6);
    }

    /// First page carries only entries that failed to parse.
    struct MalformedFirstPage {
        later: Vec<Record>,
    }

    #[async_trait]
    impl PageSource for MalformedFirstPage {
        async fn fetch(&self, page_index: usize) -> Result<Page> {
            Ok(match page_index {
                0 => Page::new(0, Vec::new()).with_skipped(3),
                1 => Page::new(1, self.later.clone()),
                _ => Page::new(page_index, Vec::new()),
            })
        }
    }

    #[tokio::test]
    async fn test_malformed_page_does_not_end_listing() {
        let source = MalformedFirstPage {
            later: make_records("p1_", 2),
        };

        let outcome = SyncEngine::default().sync(&source, &History::new()).await;

        assert_eq!(ids(&outcome.new_records), vec!["p1_0", "p1_1"]);
        assert_eq!(outcome.stop, StopReason::Exhausted);
        assert_eq!(outcome.pages_requested, 3);
    }

    #[tokio::test]
    async fn test_duplicate_within_page_first_wins() {
        let mut dup = make_record("a");
        dup.title = "Second copy".into();
        let source = ScriptedSource::new(vec![Ok(vec![make_record("a"), dup, make_record("b")])]);

        let outcome = SyncEngine::default().sync(&source, &History::new()).await;

        assert_eq!(ids(&outcome.new_records), vec!["a"]);
        assert_eq!(outcome.new_records[0].title, "Document a");
    }

    #[tokio::test]
    async fn test_idempotent_second_run() {
        let pages = vec![Ok(make_records("n", 4))];
        let first = SyncEngine::default()
            .sync(&ScriptedSource::new(pages.clone()), &History::new())
            .await;
        let second = SyncEngine::default()
            .sync(&ScriptedSource::new(pages), &first.history)
            .await;

        assert!(second.new_records.is_empty());
        assert_eq!(second.history, first.history);
    }

    #[tokio::test]
    async fn test_oversized_retention_is_capped() {
        let pages = (0..5).map(|p| Ok(make_records(&format!("p{p}_"), 100))).collect();
        let source = ScriptedSource::new(pages);
        let config = SyncConfig {
            max_pages: 5,
            retention_limit: 1000,
        };

        let outcome = SyncEngine::from_config(&config)
            .sync(&source, &History::new())
            .await;

        assert_eq!(outcome.new_records.len(), 500);
        assert_eq!(outcome.history.len(), RETENTION_LIMIT);
    }

    #[tokio::test]
    async fn test_history_stays_bounded() {
        let pages = (0..5).map(|p| Ok(make_records(&format!("p{p}_"), 50))).collect();
        let history = History::from_records(make_records("old", 200));
        let source = ScriptedSource::new(pages);

        let outcome = SyncEngine::default().sync(&source, &history).await;

        assert_eq!(outcome.new_records.len(), 250);
        assert_eq!(outcome.history.len(), RETENTION_LIMIT);
        assert_eq!(outcome.records_to_publish(), outcome.history.records());
    }
}
