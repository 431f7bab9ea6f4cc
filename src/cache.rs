//! Response cache for the news API client.
//!
//! Bodies are keyed by request URL and expire after a fixed age. Backends:
//!
//! | Backend | Storage | Survives restart |
//! |---------|---------|------------------|
//! | [`MemoryCache`] | in-process map | no |
//! | [`DiskCache`] | one JSON file per key | yes |
//! | `Disabled` | nothing | n/a |

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Default age after which a cached response is refetched.
pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(600);

/// A cached response body and when it was stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub body: String,
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    fn new(body: String) -> Self {
        Self {
            body,
            stored_at: Utc::now(),
        }
    }

    fn is_fresh(&self, expire_after: Duration) -> bool {
        // Negative age means the clock moved backwards; keep the entry.
        (Utc::now() - self.stored_at)
            .to_std()
            .map(|age| age < expire_after)
            .unwrap_or(true)
    }
}

/// In-process cache, lost when the process exits.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
    expire_after: Duration,
}

impl MemoryCache {
    pub fn new(expire_after: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expire_after,
        }
    }

    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.expire_after))
            .map(|entry| entry.body.clone())
    }

    async fn put(&self, key: &str, body: &str) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CachedResponse::new(body.to_string()));
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// File-backed cache under a directory, one JSON file per key.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    expire_after: Duration,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, expire_after: Duration) -> Self {
        Self {
            dir: dir.into(),
            expire_after,
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{digest:x}.json"))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<CachedResponse>(&raw) {
            Ok(entry) if entry.is_fresh(self.expire_after) => Ok(Some(entry.body)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache entry");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, body: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let entry = CachedResponse::new(body.to_string());
        fs::write(self.path_for(key), serde_json::to_vec(&entry)?).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// The cache backend a client was constructed with.
#[derive(Debug)]
pub enum ResponseCache {
    Memory(MemoryCache),
    Disk(DiskCache),
    Disabled,
}

impl ResponseCache {
    /// Fresh body stored under `key`, if any.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let hit = match self {
            ResponseCache::Memory(c) => c.get(key).await,
            ResponseCache::Disk(c) => c.get(key).await?,
            ResponseCache::Disabled => None,
        };
        debug!(hit = hit.is_some(), "Cache lookup");
        Ok(hit)
    }

    pub async fn put(&self, key: &str, body: &str) -> Result<()> {
        match self {
            ResponseCache::Memory(c) => c.put(key, body).await,
            ResponseCache::Disk(c) => c.put(key, body).await?,
            ResponseCache::Disabled => {}
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match self {
            ResponseCache::Memory(c) => c.clear().await,
            ResponseCache::Disk(c) => c.clear().await?,
            ResponseCache::Disabled => {}
        }
        Ok(())
    }
}
