use std::{fmt::Write as _, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Attribute, Item, KeyValueStore, StoreError, check_item_size};

/// Table kept as one JSON document per item under a directory.
///
/// Items are written to a temporary file and renamed into place, so a reader
/// sees either the old or the new item, never a partial one.
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        async_fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn get_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }

    async fn read_item(&self, key: &str) -> Result<Option<Item>, StoreError> {
        match async_fs::read_to_string(self.get_path(key)).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write_item(&self, key: &str, item: &Item) -> Result<(), StoreError> {
        check_item_size(key, item)?;

        let path = self.get_path(key);
        let tmp = self.temp_path(key);
        let json = serde_json::to_vec(item)?;
        let written = match async_fs::write(&tmp, json).await {
            Ok(()) => async_fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            let _ = async_fs::remove_file(&tmp).await;
        }
        Ok(written?)
    }

    /// Unique per process and per write, so writers sharing a directory never
    /// rename each other's half-written files.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!(
            ".{}.{}.{:08x}.tmp",
            encode_key(key),
            std::process::id(),
            rand::random::<u32>()
        ))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Item>, StoreError> {
        self.read_item(key).await
    }

    async fn put(&self, key: &str, field: &str, value: Attribute) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut item = Item::new();
        item.insert(field.to_string(), value);
        self.write_item(key, &item).await
    }

    async fn update(&self, key: &str, field: &str, value: Attribute) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut item = self.read_item(key).await?.unwrap_or_default();
        item.insert(field.to_string(), value);
        self.write_item(key, &item).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match async_fs::remove_file(self.get_path(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(StoreError::Io(e)),
            _ => Ok(()),
        }
    }
}

/// File-name-safe form of a key; anything but `[A-Za-z0-9_-]` becomes `%XX`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}
