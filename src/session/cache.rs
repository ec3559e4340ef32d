//! # Advisory Cache
//!
//! Local copies of remote data, kept only to have something to show while the
//! backend is slow or unreachable. Never authoritative: a fresh remote answer
//! always overwrites the cached value, and the cache is never consulted when one
//! is available.
//!
//! Backed by a keyed [`ResourceActor`]; values are stored as JSON so one actor
//! can hold the profile, the last address and the order list side by side.

use crate::framework::{ActorClient, ActorEntity, FrameworkError, ResourceActor, ResourceClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Profile,
    LastAddress,
    /// Number of lines in the cart, for the header badge.
    CartLength,
    AuthSession,
    /// Last order list fetched successfully.
    Orders,
    /// Return requests fetched alongside `Orders`.
    Returns,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = match self {
            CacheKey::Profile => "profile",
            CacheKey::LastAddress => "last_address",
            CacheKey::CartLength => "cart_length",
            CacheKey::AuthSession => "auth_session",
            CacheKey::Orders => "orders",
            CacheKey::Returns => "returns",
        };
        f.write_str(key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: Value,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    #[error("Cache serialization error: {0}")]
    Serialization(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[async_trait]
impl ActorEntity for CacheEntry {
    type Id = CacheKey;
    type Create = CacheEntry;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = CacheError;

    fn from_create_params(key: CacheKey, entry: CacheEntry) -> Result<Self, CacheError> {
        Ok(Self { key, ..entry })
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Handle to the cache actor. Cheap to clone.
#[derive(Clone)]
pub struct AdvisoryCache {
    inner: ResourceClient<CacheEntry>,
}

impl AdvisoryCache {
    /// Spawns the cache actor. It stops once every handle is dropped or
    /// [`shutdown`](Self::shutdown) is called.
    pub fn start() -> (Self, JoinHandle<()>) {
        let (actor, client) = ResourceActor::keyed(16);
        let task = tokio::spawn(actor.run(()));
        (Self { inner: client }, task)
    }

    /// Replaces whatever was cached under `key`.
    pub async fn store<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) -> Result<(), CacheError> {
        let value =
            serde_json::to_value(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let entry = CacheEntry {
            key,
            value,
            stored_at: Utc::now(),
        };
        self.inner.put(key, entry).await.map_err(Self::map_error)?;
        debug!(%key, "Cached");
        Ok(())
    }

    /// The cached value, if present and still readable as `T`.
    pub async fn load<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>, CacheError> {
        let Some(entry) = self.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_value(entry.value) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(%key, error = %e, "Discarding unreadable cache entry");
                Ok(None)
            }
        }
    }

    pub async fn remove(&self, key: CacheKey) -> Result<(), CacheError> {
        match self.inner.delete(key).await {
            Ok(()) | Err(FrameworkError::NotFound(_)) => Ok(()),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    pub async fn keys(&self) -> Result<Vec<CacheKey>, CacheError> {
        let entries = self.find(|_: &CacheEntry| true).await?;
        Ok(entries.into_iter().map(|entry| entry.key).collect())
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        for key in self.keys().await? {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Stops the cache actor for every handle. Later calls fail.
    pub async fn shutdown(&self) -> Result<(), CacheError> {
        self.inner.shutdown().await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<CacheEntry> for AdvisoryCache {
    type Error = CacheError;

    fn inner(&self) -> &ResourceClient<CacheEntry> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        CacheError::ActorCommunicationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_replaces_and_load_reads_back() {
        let (cache, task) = AdvisoryCache::start();

        cache.store(CacheKey::LastAddress, "1 Old Road").await.unwrap();
        cache.store(CacheKey::LastAddress, "2 New Road").await.unwrap();
        let address: Option<String> = cache.load(CacheKey::LastAddress).await.unwrap();
        assert_eq!(address.as_deref(), Some("2 New Road"));

        let missing: Option<String> = cache.load(CacheKey::Profile).await.unwrap();
        assert!(missing.is_none());

        drop(cache);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_treated_as_missing() {
        let (cache, _task) = AdvisoryCache::start();
        cache.store(CacheKey::CartLength, "three").await.unwrap();
        let length: Option<u32> = cache.load(CacheKey::CartLength).await.unwrap();
        assert!(length.is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let (cache, _task) = AdvisoryCache::start();
        cache.store(CacheKey::CartLength, &3u32).await.unwrap();
        cache.store(CacheKey::AuthSession, "token").await.unwrap();
        assert_eq!(cache.keys().await.unwrap().len(), 2);

        cache.clear().await.unwrap();
        assert!(cache.keys().await.unwrap().is_empty());
        cache.remove(CacheKey::Orders).await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_closes_every_handle() {
        let (cache, task) = AdvisoryCache::start();
        let other = cache.clone();
        other.store(CacheKey::Returns, &Vec::<u32>::new()).await.unwrap();

        cache.shutdown().await.unwrap();
        task.await.unwrap();

        assert!(matches!(
            other.keys().await,
            Err(CacheError::ActorCommunicationError(_))
        ));
        assert!(other.store(CacheKey::Profile, "x").await.is_err());
    }
}
