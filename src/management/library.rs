use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::progress::{
    FIELD_MESSAGE, FIELD_PARTITION_KEYS, FIELD_PROFILE, FIELD_SCRAPE_TIME, FIELD_TRACKS,
    ScrapeStage,
};
use crate::{
    library::{CodecError, reassemble},
    store::{Item, KeyValueStore, StoreError},
    types::Track,
};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("no library stored for user '{0}'")]
    NotFound(String),

    #[error("library of '{user_id}' is not ready (status: {message})")]
    NotReady { user_id: String, message: String },

    #[error("partition '{0}' is missing")]
    MissingPartition(String),
}

/// What a poller sees of a user's record.
#[derive(Debug, Clone, Serialize)]
pub struct UserLibraryRecord {
    pub user_id: String,
    pub profile: Option<Value>,
    pub scrape_time: Option<i64>,
    pub message: Option<String>,
    pub partition_keys: Vec<String>,
}

impl UserLibraryRecord {
    pub fn from_item(user_id: &str, item: &Item) -> Self {
        Self {
            user_id: user_id.to_string(),
            profile: item.get(FIELD_PROFILE).and_then(|a| a.as_document()).cloned(),
            scrape_time: item.get(FIELD_SCRAPE_TIME).and_then(|a| a.as_number()),
            message: item
                .get(FIELD_MESSAGE)
                .and_then(|a| a.as_text())
                .map(str::to_string),
            partition_keys: item
                .get(FIELD_PARTITION_KEYS)
                .and_then(|a| a.as_list())
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }

    pub fn stage(&self) -> Option<ScrapeStage> {
        self.message.as_deref().and_then(ScrapeStage::from_message)
    }

    pub fn is_done(&self) -> bool {
        self.stage() == Some(ScrapeStage::Done)
    }
}

/// Read side of the stored libraries.
pub struct LibraryManager {
    store: Arc<dyn KeyValueStore>,
}

impl LibraryManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load_record(&self, user_id: &str) -> Result<Option<UserLibraryRecord>, StoreError> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .map(|item| UserLibraryRecord::from_item(user_id, &item)))
    }

    /// Reassembles the enriched track list of a finished scrape.
    pub async fn load_tracks(&self, user_id: &str) -> Result<Vec<Track>, LibraryError> {
        let record = self
            .load_record(user_id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(user_id.to_string()))?;

        if !record.is_done() {
            return Err(LibraryError::NotReady {
                user_id: user_id.to_string(),
                message: record.message.unwrap_or_default(),
            });
        }

        let mut partitions = Vec::with_capacity(record.partition_keys.len());
        for key in &record.partition_keys {
            let bytes = self
                .store
                .get(key)
                .await?
                .and_then(|mut item| item.remove(FIELD_TRACKS))
                .and_then(|attr| attr.as_binary().map(<[u8]>::to_vec))
                .ok_or_else(|| LibraryError::MissingPartition(key.clone()))?;
            partitions.push(bytes);
        }

        Ok(reassemble(partitions)?)
    }
}
