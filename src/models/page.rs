//! One page of portal results and the request that produces it.

use crate::models::Record;

/// Records returned by one listing call, newest-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub records: Vec<Record>,
    /// Entries the listing returned that could not be turned into records
    pub skipped: usize,
}

impl Page {
    pub fn new(index: usize, records: Vec<Record>) -> Self {
        Self {
            index,
            records,
            skipped: 0,
        }
    }

    /// Record how many raw entries were dropped while parsing.
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    /// No usable records on this page.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The listing returned nothing at all, so there are no further pages.
    ///
    /// A page whose entries were all malformed is not exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.records.is_empty() && self.skipped == 0
    }
}

/// Query for a single listing page.
///
/// Built fresh for every fetch from the fixed filters plus the page index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    filters: Vec<(&'static str, String)>,
    page: usize,
}

impl PageRequest {
    pub fn new(filters: Vec<(&'static str, String)>, page: usize) -> Self {
        Self { filters, page }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Query-string pairs: fixed filters followed by `page`.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = self.filters.clone();
        query.push(("page", self.page.to_string()));
        query
    }
}
