// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, REFERER,
};

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Create an HTTP client carrying the headers the portal's own search page sends.
pub fn create_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

    let referer = HeaderValue::from_str(&config.referer)
        .map_err(|e| AppError::config(format!("Invalid referer '{}': {e}", config.referer)))?;
    headers.insert(REFERER, referer);

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
