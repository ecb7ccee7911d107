//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::RETENTION_LIMIT;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Portal endpoint and request settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Paging and retention bounds
    #[serde(default)]
    pub sync: SyncConfig,

    /// RSS channel settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// File names inside the data directory
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.page_size == 0 {
            return Err(AppError::validation("source.page_size must be > 0"));
        }
        Url::parse(&self.source.endpoint)
            .map_err(|e| AppError::validation(format!("source.endpoint is invalid: {e}")))?;
        if self.sync.max_pages == 0 {
            return Err(AppError::validation("sync.max_pages must be > 0"));
        }
        if self.sync.retention_limit == 0 {
            return Err(AppError::validation("sync.retention_limit must be > 0"));
        }
        if self.sync.retention_limit > RETENTION_LIMIT {
            return Err(AppError::validation(format!(
                "sync.retention_limit must be <= {RETENTION_LIMIT}"
            )));
        }
        Url::parse(&self.feed.detail_base_url)
            .map_err(|e| AppError::validation(format!("feed.detail_base_url is invalid: {e}")))?;
        if self.feed.output_file.trim().is_empty() {
            return Err(AppError::validation("feed.output_file is empty"));
        }
        if self.storage.history_file.trim().is_empty() {
            return Err(AppError::validation("storage.history_file is empty"));
        }
        Ok(())
    }
}

/// Portal request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Search endpoint of the documents-request portal
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Referer header the portal expects from its own search page
    #[serde(default = "defaults::referer")]
    pub referer: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between page requests in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Records per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Sort order; must be newest-first for incremental sync to hold
    #[serde(default = "defaults::sort")]
    pub sort: String,

    /// Comma-separated disclosure types to request
    #[serde(default = "defaults::disclosure_types")]
    pub disclosure_types: String,

    /// Department filter (empty = all)
    #[serde(default)]
    pub departments: String,

    /// Exception filter (empty = all)
    #[serde(default)]
    pub exceptions: String,

    /// Keyword filter (empty = all)
    #[serde(default)]
    pub keywords: String,
}

impl SourceConfig {
    /// Fixed query filters sent with every page request.
    pub fn filters(&self) -> Vec<(&'static str, String)> {
        let types = self.disclosure_types.to_ascii_uppercase();
        let partial = types.contains("PARTIAL");
        let full = types.contains("FULL_ACCESS");

        vec![
            ("disclosureDepartments", self.departments.clone()),
            ("exceptionsInvolved", self.exceptions.clone()),
            ("associatedKeywords", self.keywords.clone()),
            ("disclosureType", self.disclosure_types.clone()),
            ("isPartial", partial.to_string()),
            ("isFullAccess", full.to_string()),
            ("size", self.page_size.to_string()),
            ("sort", self.sort.clone()),
        ]
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            referer: defaults::referer(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: 0,
            page_size: defaults::page_size(),
            sort: defaults::sort(),
            disclosure_types: defaults::disclosure_types(),
            departments: String::new(),
            exceptions: String::new(),
            keywords: String::new(),
        }
    }
}

/// Paging and retention bounds for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Hard ceiling on page requests per run
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Maximum history length kept between runs
    #[serde(default = "defaults::retention_limit")]
    pub retention_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_pages: defaults::max_pages(),
            retention_limit: defaults::retention_limit(),
        }
    }
}

/// RSS channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "defaults::feed_title")]
    pub title: String,

    #[serde(default = "defaults::feed_link")]
    pub link: String,

    #[serde(default = "defaults::feed_description")]
    pub description: String,

    /// Base URL of the document detail page; the id is appended
    #[serde(default = "defaults::detail_base_url")]
    pub detail_base_url: String,

    /// Feed file name, relative to the data directory
    #[serde(default = "defaults::output_file")]
    pub output_file: String,
}

impl FeedConfig {
    /// Canonical detail-page link for a document id.
    pub fn detail_link(&self, id: &str) -> String {
        format!("{}/{}", self.detail_base_url.trim_end_matches('/'), id)
    }

    pub fn output_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.output_file)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: defaults::feed_title(),
            link: defaults::feed_link(),
            description: defaults::feed_description(),
            detail_base_url: defaults::detail_base_url(),
            output_file: defaults::output_file(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// History file name, relative to the data directory
    #[serde(default = "defaults::history_file")]
    pub history_file: String,
}

impl StorageConfig {
    pub fn history_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.history_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_file: defaults::history_file(),
        }
    }
}

mod defaults {
    use crate::models::RETENTION_LIMIT;

    // Source defaults
    pub fn endpoint() -> String {
        "https://ec.europa.eu/transparency/documents-request/api/portal/search/criteria".into()
    }
    pub fn referer() -> String {
        "https://ec.europa.eu/transparency/documents-request/search".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; disclosure-feed/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn page_size() -> usize {
        50
    }
    pub fn sort() -> String {
        "publishedOn,DESC".into()
    }
    pub fn disclosure_types() -> String {
        "FULL_ACCESS,PARTIAL".into()
    }

    // Sync defaults
    pub fn max_pages() -> usize {
        5
    }
    pub fn retention_limit() -> usize {
        RETENTION_LIMIT
    }

    // Feed defaults
    pub fn feed_title() -> String {
        "EU Documents RSS Feed".into()
    }
    pub fn feed_link() -> String {
        "https://github.com/rkoens/ease".into()
    }
    pub fn feed_description() -> String {
        "Latest documents from the EU Transparency Portal".into()
    }
    pub fn detail_base_url() -> String {
        "https://ec.europa.eu/transparency/documents-request/search/document-details".into()
    }
    pub fn output_file() -> String {
        "feed.xml".into()
    }

    // Storage defaults
    pub fn history_file() -> String {
        "processed_documents.json".into()
    }
}
