// src/services/portal.rs

//! Transparency Portal listing client.
//!
//! Fetches one page of the documents-request search endpoint per call and
//! converts its `content` array into [`Record`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{DocumentPayload, Page, PageRequest, Record, SourceConfig};
use crate::services::PageSource;
use crate::utils::http;

/// Body of a search response. Only `content` is used.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    content: Option<Vec<Value>>,
}

/// HTTP page source for the portal search endpoint.
pub struct PortalClient {
    client: Client,
    endpoint: Url,
    filters: Vec<(&'static str, String)>,
    delay: Duration,
}

impl PortalClient {
    /// Create a new portal client with the given configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Self::with_client(config, http::create_client(config)?)
    }

    /// Create a portal client around an already-built HTTP client.
    pub fn with_client(config: &SourceConfig, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: Url::parse(&config.endpoint)?,
            filters: config.filters(),
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Build the request for one page.
    pub fn request(&self, page_index: usize) -> PageRequest {
        PageRequest::new(self.filters.clone(), page_index)
    }

    /// Parse a response body into a page, dropping malformed documents.
    pub fn parse_page(page_index: usize, body: &[u8]) -> Result<Page> {
        let response: SearchResponse = serde_json::from_slice(body)
            .map_err(|e| AppError::fetch(page_index, format!("invalid JSON body: {e}")))?;
        let content = response
            .content
            .ok_or_else(|| AppError::fetch(page_index, "response has no content array"))?;

        let total = content.len();
        let mut records = Vec::with_capacity(total);
        for (position, value) in content.into_iter().enumerate() {
            let parsed = serde_json::from_value::<DocumentPayload>(value)
                .map_err(|e| e.to_string())
                .and_then(Record::try_from);
            match parsed {
                Ok(record) => records.push(record),
                Err(reason) => log::warn!(
                    "Skipping document {} on page {}: {}",
                    position,
                    page_index,
                    reason
                ),
            }
        }

        let skipped = total - records.len();
        Ok(Page::new(page_index, records).with_skipped(skipped))
    }
}

#[async_trait]
impl PageSource for PortalClient {
    async fn fetch(&self, page_index: usize) -> Result<Page> {
        if page_index > 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let request = self.request(page_index);
        log::debug!("Fetching page {} from {}", page_index, self.endpoint);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&request.query())
            .send()
            .await
            .map_err(|e| AppError::fetch(page_index, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(page_index, format!("HTTP status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(page_index, e))?;
        Self::parse_page(page_index, &body)
    }
}
