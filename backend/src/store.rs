//! Persisted client state: opaque JSON blobs under fixed names, plus pinned
//! map locations. Two backends share the [`Store`] trait: [`MemoryStore`]
//! for development and tests, and `database::Database` for PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{GeoPoint, RecentSearch};
use tokio::sync::RwLock;

pub const MAX_RECENT_SEARCHES: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to encode stored state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Names under which client state blobs are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    RecentSearches,
    Favorites,
    Onboarding,
    TourForm,
}

impl StateKey {
    pub const ALL: [StateKey; 4] = [
        StateKey::RecentSearches,
        StateKey::Favorites,
        StateKey::Onboarding,
        StateKey::TourForm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::RecentSearches => "recentSearches",
            StateKey::Favorites => "favorites",
            StateKey::Onboarding => "hasCompletedOnboarding",
            StateKey::TourForm => "tourForm",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PinnedLocation {
    pub id: i32,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
}

/// Computes the next value of a blob from its current one.
pub type BlobUpdate = Box<dyn FnOnce(Option<Value>) -> Result<Value, StoreError> + Send>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_blob(&self, key: StateKey) -> Result<Option<Value>, StoreError>;
    async fn put_blob(&self, key: StateKey, value: Value) -> Result<(), StoreError>;
    async fn delete_blob(&self, key: StateKey) -> Result<(), StoreError>;

    /// Read-modify-write of one blob. No other write to `key` lands between
    /// the read and the write. Returns the stored value.
    async fn update_blob(&self, key: StateKey, update: BlobUpdate) -> Result<Value, StoreError>;

    async fn save_location(&self, point: GeoPoint) -> Result<PinnedLocation, StoreError>;
    /// Most recent first.
    async fn list_locations(&self) -> Result<Vec<PinnedLocation>, StoreError>;
}

/// Prepend a search to the recent list, keeping the newest few.
pub async fn push_recent_search(
    store: &dyn Store,
    search: RecentSearch,
) -> Result<Vec<RecentSearch>, StoreError> {
    let stored = store
        .update_blob(
            StateKey::RecentSearches,
            Box::new(move |current: Option<Value>| -> Result<Value, StoreError> {
                let mut searches: Vec<RecentSearch> = match current {
                    Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
                        tracing::warn!("discarding unreadable recent searches: {err}");
                        Vec::new()
                    }),
                    None => Vec::new(),
                };

                searches.insert(0, search);
                searches.truncate(MAX_RECENT_SEARCHES);
                Ok(serde_json::to_value(&searches)?)
            }),
        )
        .await?;

    Ok(serde_json::from_value(stored)?)
}

#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<StateKey, Value>>,
    locations: RwLock<Vec<PinnedLocation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_blob(&self, key: StateKey) -> Result<Option<Value>, StoreError> {
        Ok(self.blobs.read().await.get(&key).cloned())
    }

    async fn put_blob(&self, key: StateKey, value: Value) -> Result<(), StoreError> {
        self.blobs.write().await.insert(key, value);
        Ok(())
    }

    async fn update_blob(&self, key: StateKey, update: BlobUpdate) -> Result<Value, StoreError> {
        let mut blobs = self.blobs.write().await;
        let value = update(blobs.get(&key).cloned())?;
        blobs.insert(key, value.clone());
        Ok(value)
    }

    async fn delete_blob(&self, key: StateKey) -> Result<(), StoreError> {
        self.blobs.write().await.remove(&key);
        Ok(())
    }

    async fn save_location(&self, point: GeoPoint) -> Result<PinnedLocation, StoreError> {
        let mut locations = self.locations.write().await;
        let location = PinnedLocation {
            id: locations.len() as i32 + 1,
            lat: point.lat,
            lng: point.lon,
            created_at: Utc::now(),
        };
        locations.push(location.clone());
        Ok(location)
    }

    async fn list_locations(&self) -> Result<Vec<PinnedLocation>, StoreError> {
        Ok(self.locations.read().await.iter().rev().cloned().collect())
    }
}
