use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use wayfare_core::{KeyValueStore, StorageError};

/// Fixed keys of everything the app persists. Values are JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AuthToken,
    CurrentUser,
    Users,
    RecentSearches,
    Favorites,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AuthToken => "@wayfare:authToken",
            StorageKey::CurrentUser => "@wayfare:currentUser",
            StorageKey::Users => "@wayfare:users",
            StorageKey::RecentSearches => "@wayfare:recentSearches",
            StorageKey::Favorites => "@wayfare:favorites",
        }
    }
}

/// Process-local store, used in tests and when no storage path is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// All keys in one JSON object on disk.
///
/// Every write rewrites the whole document through a sibling temp file and a
/// rename, so a crash mid-write leaves the previous version intact. Writers
/// are serialized by `lock`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }

    async fn update<F>(&self, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut HashMap<String, String>) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        apply(&mut entries);
        self.persist(&entries).await
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let key = key.to_string();
        self.update(move |entries| {
            entries.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
        .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.update(|entries| entries.clear()).await
    }
}

/// Typed JSON access on top of any `KeyValueStore`.
#[derive(Clone)]
pub struct JsonStorage {
    store: Arc<dyn KeyValueStore>,
}

impl JsonStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// `Ok(None)` when the key is unset. Unparseable values are reported, not hidden.
    pub async fn get_json<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StorageError> {
        match self.store.get(key.as_str()).await? {
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    warn!("Discarding unreadable value under {}: {}", key.as_str(), e);
                    Err(e.into())
                }
            },
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + Sync>(&self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;
        self.store.set(key.as_str(), text).await
    }

    pub async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.store.remove(key.as_str()).await
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.clear().await
    }
}
