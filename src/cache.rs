//! On-disk cache with per-entry expiry
//!
//! [`PersistentCache`] owns the fjall keyspace. Callers normally go through a
//! [`TypedCache`], which fixes the value type and prefixes every key with a
//! namespace so weather readings and garment history never collide.

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

use crate::OutfitAiError;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    /// Unix seconds
    expires_at: u64,
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

impl<T> StoredEntry<T> {
    fn expiring_in(value: T, ttl: Duration) -> Result<Self> {
        let expires_at = unix_now()?
            .checked_add(ttl.as_secs())
            .ok_or(anyhow!("TTL overflow"))?;
        Ok(Self { value, expires_at })
    }

    fn is_fresh_at(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
}

impl PersistentCache {
    /// Open (or create) the cache database under `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path).open().map_err(|e| {
            OutfitAiError::cache(format!(
                "Failed to open cache database at {}: {e}",
                path.display()
            ))
        })?;
        let store = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { store })
    }

    /// Values of type `T` stored under `<namespace>:<key>`
    #[must_use]
    pub fn typed<T>(&self, namespace: &'static str) -> TypedCache<T> {
        TypedCache {
            cache: self.clone(),
            namespace,
            _value: PhantomData,
        }
    }

    async fn read_raw(&self, key: String) -> Result<Option<Vec<u8>>> {
        let store = self.store.clone();
        task::spawn_blocking(move || -> Result<Option<Vec<u8>>> {
            Ok(store.get(key.as_bytes())?.map(|v| v.to_vec()))
        })
        .await?
    }

    async fn write_raw(&self, key: String, bytes: Vec<u8>) -> Result<()> {
        let store = self.store.clone();
        task::spawn_blocking(move || store.insert(key.as_bytes(), bytes)).await??;
        Ok(())
    }

    async fn delete_raw(&self, key: String) -> Result<()> {
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key.as_bytes())).await??;
        Ok(())
    }
}

/// Namespaced view of a [`PersistentCache`] holding one value type
pub struct TypedCache<T> {
    cache: PersistentCache,
    namespace: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedCache<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            namespace: self.namespace,
            _value: PhantomData,
        }
    }
}

impl<T> TypedCache<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value), fields(namespace = self.namespace))]
    pub async fn put(&self, key: &str, value: T, ttl: Duration) -> Result<()> {
        let bytes = postcard::to_stdvec(&StoredEntry::expiring_in(value, ttl)?)?;
        self.cache.write_raw(self.full_key(key), bytes).await
    }

    /// `None` for misses and for expired entries, which are removed on the way
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self), fields(namespace = self.namespace))]
    pub async fn get(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.full_key(key);
        let Some(bytes) = self.cache.read_raw(full_key.clone()).await? else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        if entry.is_fresh_at(unix_now()?) {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.cache.delete_raw(full_key).await?;
            Ok(None)
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.cache.delete_raw(self.full_key(key)).await
    }
}
