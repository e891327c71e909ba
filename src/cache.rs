//! Read-through record cache.
//!
//! The backend is a plain byte store addressed by string keys; [`RecordCache`] layers typed JSON snapshots keyed by
//! `(entity kind, id)` on top of it. Entries never expire on their own. Freshness is maintained exclusively by
//! invalidating a key after every mutation of the corresponding record.
use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::fmt::Display;
use std::sync::Arc;

use crate::error::Result;
use crate::types::EntityKind;

#[async_trait]
pub trait CacheBackend: Debug + Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Arc<Vec<u8>>>>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;
    /// Removing an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-process backend over a [moka](https://crates.io/crates/moka) cache.
#[derive(Debug, Clone)]
pub struct MokaBackend {
    cache: Cache<String, Arc<Vec<u8>>>,
}

impl MokaBackend {
    pub fn new(name: &str, max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .name(name)
                .eviction_policy(EvictionPolicy::tiny_lfu())
                .build(),
        }
    }
}

#[async_trait]
impl CacheBackend for MokaBackend {
    async fn get(&self, key: &str) -> Result<Option<Arc<Vec<u8>>>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.cache.insert(key.to_string(), Arc::new(value)).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: EntityKind,
    pub id:   i32,
}

impl CacheKey {
    pub fn new(kind: EntityKind, id: i32) -> Self {
        Self { kind, id }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone)]
pub struct RecordCache {
    name:    &'static str,
    backend: Arc<dyn CacheBackend>,
}

impl RecordCache {
    pub fn new(name: &'static str, backend: Arc<dyn CacheBackend>) -> Self {
        Self { name, backend }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn get<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>> {
        let Some(bytes) = self.backend.get(&key.to_string()).await?
        else {
            log::debug!("[{}] MISS({key})", self.name());
            return Ok(None);
        };
        log::debug!("[{}] HIT({key})", self.name());
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub async fn set<T: Serialize>(&self, key: CacheKey, value: &T) -> Result<()> {
        log::debug!("[{}] SET({key})", self.name());
        self.backend.set(&key.to_string(), serde_json::to_vec(value)?).await
    }

    pub async fn invalidate(&self, key: CacheKey) -> Result<()> {
        log::debug!("[{}] INVALIDATE({key})", self.name());
        self.backend.delete(&key.to_string()).await
    }
}
