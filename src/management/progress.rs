use serde_json::Value;
use tracing::info;

use crate::store::{Attribute, KeyValueStore, StoreError};

pub const FIELD_PROFILE: &str = "profile";
pub const FIELD_SCRAPE_TIME: &str = "scrape_time";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_PARTITION_KEYS: &str = "partition_keys";
pub const FIELD_TRACKS: &str = "tracks";

/// Pipeline milestones, in the order a poller sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScrapeStage {
    ScrapingLibrary,
    ScrapingFeatures,
    ScrapingGenres,
    Writing,
    Done,
}

impl ScrapeStage {
    pub const ALL: [ScrapeStage; 5] = [
        ScrapeStage::ScrapingLibrary,
        ScrapeStage::ScrapingFeatures,
        ScrapeStage::ScrapingGenres,
        ScrapeStage::Writing,
        ScrapeStage::Done,
    ];

    pub fn message(&self) -> &'static str {
        match self {
            ScrapeStage::ScrapingLibrary => "Scraping library",
            ScrapeStage::ScrapingFeatures => "Scraping song features",
            ScrapeStage::ScrapingGenres => "Scraping artist genres",
            ScrapeStage::Writing => "Writing to database",
            ScrapeStage::Done => "Done",
        }
    }

    pub fn from_message(message: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.message() == message)
    }
}

pub fn partition_key(user_id: &str, index: usize) -> String {
    format!("{user_id}_tracks_{index}")
}

/// Writes a user's scrape progress and results as the pipeline advances.
///
/// Every call goes straight to the store; nothing is buffered.
pub struct ProgressReporter<'a> {
    store: &'a dyn KeyValueStore,
    user_id: String,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(store: &'a dyn KeyValueStore, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn write_profile(&self, profile: &Value) -> Result<(), StoreError> {
        self.update(FIELD_PROFILE, Attribute::Document(profile.clone())).await
    }

    pub async fn write_scrape_time(&self, micros: i64) -> Result<(), StoreError> {
        self.update(FIELD_SCRAPE_TIME, Attribute::Number(micros)).await
    }

    pub async fn set_stage(&self, stage: ScrapeStage) -> Result<(), StoreError> {
        self.update(FIELD_MESSAGE, Attribute::Text(stage.message().to_string()))
            .await
    }

    /// Stores each partition as its own item and returns their keys in order.
    pub async fn write_partitions(&self, partitions: Vec<Vec<u8>>) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::with_capacity(partitions.len());
        for (i, partition) in partitions.into_iter().enumerate() {
            let key = partition_key(&self.user_id, i);
            let value = Attribute::Binary(partition);
            log_write(&key, FIELD_TRACKS, &value);
            self.store.put(&key, FIELD_TRACKS, value).await?;
            keys.push(key);
        }
        Ok(keys)
    }

    pub async fn write_partition_keys(&self, keys: &[String]) -> Result<(), StoreError> {
        self.update(FIELD_PARTITION_KEYS, Attribute::List(keys.to_vec()))
            .await
    }

    async fn update(&self, field: &str, value: Attribute) -> Result<(), StoreError> {
        log_write(&self.user_id, field, &value);
        self.store.update(&self.user_id, field, value).await
    }
}

fn log_write(key: &str, field: &str, value: &Attribute) {
    let size_kb = value.size() as f64 / 1024.0;
    match value {
        Attribute::Binary(_) => info!("writing {key} --> '{field}' : Bytes ({size_kb:.1} KB)"),
        Attribute::Text(text) => info!("writing {key} --> '{field}' : {text} ({size_kb:.1} KB)"),
        _ => info!("writing {key} --> '{field}' ({size_kb:.1} KB)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_messages_roundtrip() {
        for stage in ScrapeStage::ALL {
            assert_eq!(ScrapeStage::from_message(stage.message()), Some(stage));
        }
        assert_eq!(ScrapeStage::from_message("Something else"), None);
        assert_eq!(ScrapeStage::Done.message(), "Done");
    }

    #[test]
    fn test_partition_key() {
        assert_eq!(partition_key("u1", 0), "u1_tracks_0");
        assert_eq!(partition_key("u1", 12), "u1_tracks_12");
    }
}
