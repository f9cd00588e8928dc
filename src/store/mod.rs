//! # Key-Value Store
//!
//! The persistence boundary of the pipeline: a table of items addressed by a
//! single primary key, each item a flat map of field name to typed
//! [`Attribute`]. Backends enforce the per-item size ceiling
//! ([`ITEM_SIZE_LIMIT`]); callers split payloads that would break it.
//!
//! - [`MemoryStore`] keeps the table in process memory.
//! - [`FileStore`] keeps one JSON document per item on disk.
//!
//! Every write is visible to the next `get` once it returns, which is what the
//! progress poller relies on. Nothing coordinates concurrent writers of the
//! same item.

mod file;
mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Hard per-item size ceiling of the backing store.
pub const ITEM_SIZE_LIMIT: usize = 400 * 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item '{key}' is {size} bytes, limit is {limit}")]
    ItemTooLarge {
        key: String,
        size: usize,
        limit: usize,
    },

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "S")]
    Text(String),
    #[serde(rename = "N")]
    Number(i64),
    #[serde(rename = "B", with = "base64_bytes")]
    Binary(Vec<u8>),
    #[serde(rename = "L")]
    List(Vec<String>),
    #[serde(rename = "M")]
    Document(Value),
}

impl Attribute {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Attribute::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Attribute::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Attribute::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Attribute::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Value> {
        match self {
            Attribute::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Approximate stored size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Attribute::Text(s) => s.len(),
            Attribute::Number(n) => n.to_string().len(),
            Attribute::Binary(b) => b.len(),
            Attribute::List(l) => 3 + l.iter().map(|s| s.len() + 1).sum::<usize>(),
            Attribute::Document(v) => v.to_string().len(),
        }
    }
}

pub type Item = BTreeMap<String, Attribute>;

/// Stored size of `item` under `key`: key plus every field name and value.
pub fn item_size(key: &str, item: &Item) -> usize {
    key.len()
        + item
            .iter()
            .map(|(field, value)| field.len() + value.size())
            .sum::<usize>()
}

pub(crate) fn check_item_size(key: &str, item: &Item) -> Result<(), StoreError> {
    let size = item_size(key, item);
    if size > ITEM_SIZE_LIMIT {
        return Err(StoreError::ItemTooLarge {
            key: key.to_string(),
            size,
            limit: ITEM_SIZE_LIMIT,
        });
    }
    Ok(())
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// The whole item, or `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Item>, StoreError>;

    /// Replaces the item under `key` with one holding only `field`.
    async fn put(&self, key: &str, field: &str, value: Attribute) -> Result<(), StoreError>;

    /// Sets `field` on the item under `key`, creating the item if needed.
    async fn update(&self, key: &str, field: &str, value: Attribute) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}
