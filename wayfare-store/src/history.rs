use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use wayfare_core::history::push_recent;
use wayfare_core::{RecentSearch, StorageError};

use crate::storage::{JsonStorage, StorageKey};

pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Recent searches and favorites, persisted as JSON lists.
#[derive(Clone)]
pub struct SearchHistory {
    storage: JsonStorage,
    limit: usize,
}

impl SearchHistory {
    pub fn new(storage: JsonStorage) -> Self {
        Self::with_limit(storage, DEFAULT_RECENT_LIMIT)
    }

    pub fn with_limit(storage: JsonStorage, limit: usize) -> Self {
        Self { storage, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Newest first.
    pub async fn recent_searches(&self) -> Result<Vec<RecentSearch>, StorageError> {
        Ok(self
            .storage
            .get_json(StorageKey::RecentSearches)
            .await?
            .unwrap_or_default())
    }

    /// Store `entry` at the front, replacing an older entry with the same id.
    pub async fn save_recent_search(&self, entry: RecentSearch) -> Result<Vec<RecentSearch>, StorageError> {
        let current = self.recent_searches().await?;
        let updated = push_recent(&current, entry, self.limit);
        self.storage.set_json(StorageKey::RecentSearches, &updated).await?;
        Ok(updated)
    }

    pub async fn clear_recent_searches(&self) -> Result<(), StorageError> {
        info!("Clearing recent searches");
        self.storage.remove(StorageKey::RecentSearches).await
    }

    pub async fn favorites<T: DeserializeOwned>(&self) -> Result<Vec<T>, StorageError> {
        Ok(self.storage.get_json(StorageKey::Favorites).await?.unwrap_or_default())
    }

    pub async fn add_favorite<T>(&self, item: T) -> Result<(), StorageError>
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        let mut favorites: Vec<T> = self.favorites().await?;
        favorites.push(item);
        self.storage.set_json(StorageKey::Favorites, &favorites).await
    }

    /// Removes every favorite equal to `item`.
    pub async fn remove_favorite<T>(&self, item: &T) -> Result<(), StorageError>
    where
        T: Serialize + DeserializeOwned + PartialEq + Sync,
    {
        let favorites: Vec<T> = self.favorites().await?;
        let updated: Vec<T> = favorites.into_iter().filter(|f| f != item).collect();
        self.storage.set_json(StorageKey::Favorites, &updated).await
    }
}
