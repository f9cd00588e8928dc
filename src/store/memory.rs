use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Attribute, Item, KeyValueStore, StoreError, check_item_size};

/// Process-local table.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, field: &str, value: Attribute) -> Result<(), StoreError> {
        let mut item = Item::new();
        item.insert(field.to_string(), value);
        check_item_size(key, &item)?;

        self.items.write().await.insert(key.to_string(), item);
        Ok(())
    }

    async fn update(&self, key: &str, field: &str, value: Attribute) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let mut item = items.get(key).cloned().unwrap_or_default();
        item.insert(field.to_string(), value);
        check_item_size(key, &item)?;

        items.insert(key.to_string(), item);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.items.write().await.remove(key);
        Ok(())
    }
}
