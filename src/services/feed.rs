//! RSS 2.0 feed output.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rss::{Category, Channel, Guid, Item};

use crate::error::Result;
use crate::models::{FeedConfig, Record};
use crate::services::FeedPublisher;
use crate::utils::fs::write_atomic;

/// Publication date for a record: its disclosure date at midnight UTC, or
/// `now` when the date cannot be parsed.
pub fn pub_date(record: &Record, now: DateTime<Utc>) -> DateTime<Utc> {
    record
        .parsed_date()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(now)
}

fn build_item(config: &FeedConfig, record: &Record, now: DateTime<Utc>) -> Item {
    let mut guid = Guid::default();
    guid.set_value(record.id.clone());
    guid.set_permalink(false);

    let mut category = Category::default();
    category.set_name(record.disclosure_type.clone());

    let mut item = Item::default();
    item.set_title(record.title.clone());
    item.set_link(config.detail_link(&record.id));
    item.set_description(record.title.clone());
    item.set_pub_date(pub_date(record, now).to_rfc2822());
    item.set_guid(guid);
    item.set_categories(vec![category]);
    item
}

/// Build the channel for `records`, keeping their order.
pub fn build_channel(config: &FeedConfig, records: &[Record], now: DateTime<Utc>) -> Channel {
    let items: Vec<Item> = records
        .iter()
        .map(|record| build_item(config, record, now))
        .collect();

    let mut channel = Channel::default();
    channel.set_title(config.title.clone());
    channel.set_link(config.link.clone());
    channel.set_description(config.description.clone());
    channel.set_language("en".to_string());
    channel.set_last_build_date(
        records
            .first()
            .map(|newest| pub_date(newest, now).to_rfc2822()),
    );
    channel.set_items(items);
    channel
}

/// Serialize a channel as indented XML.
pub fn render(channel: &Channel) -> Result<Vec<u8>> {
    Ok(channel.pretty_write_to(Vec::new(), b' ', 2)?)
}

/// Writes the feed to a file in the data directory.
#[derive(Debug, Clone)]
pub struct RssFeedWriter {
    config: FeedConfig,
    path: PathBuf,
}

impl RssFeedWriter {
    pub fn new(config: FeedConfig, path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            path: path.into(),
        }
    }
}

#[async_trait]
impl FeedPublisher for RssFeedWriter {
    async fn publish(&self, records: &[Record]) -> Result<()> {
        let channel = build_channel(&self.config, records, Utc::now());
        let xml = render(&channel)?;
        write_atomic(&self.path, &xml).await?;

        log::info!(
            "Feed with {} items written to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}
