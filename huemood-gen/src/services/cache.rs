//! Key-value response cache
//!
//! Two backends behind [`CacheStore`]:
//! - [`RedisCache`]: shared networked cache (`SET key value EX ttl`)
//! - [`MemoryCache`]: in-process map with per-entry expiry
//!
//! [`ResponseCache`] is what the engine talks to. It namespaces keys,
//! serializes values as JSON, bounds every round trip, and turns every
//! backend failure into a logged miss or no-op. Cache trouble never fails a
//! generation request.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

use huemood_common::config::CacheConfig;

/// Cache backend errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache connection closed")]
    Closed,
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

/// Raw string key-value store with per-entry TTL
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Backend name for logging and health reporting
    fn backend_name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Release backend resources; later operations fail with [`CacheError::Closed`]
    async fn close(&self) -> Result<(), CacheError>;
}

// ============================================================================
// In-process backend
// ============================================================================

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// Entry cap used by [`MemoryCache::new`]
pub const DEFAULT_MEMORY_MAX_ENTRIES: usize = 10_000;

/// Writes between sweeps of expired entries
const PURGE_INTERVAL: usize = 256;

/// In-process cache with lazy expiry and a fixed entry cap
///
/// Expired entries are invisible to `get`. They are swept every
/// [`PURGE_INTERVAL`] writes and whenever the map is full. A full map with
/// nothing expired evicts the entry closest to expiry.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    max_entries: usize,
    writes: AtomicUsize,
    closed: AtomicBool,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_MAX_ENTRIES)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
            writes: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Live (unexpired) entry count
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.closed.load(Ordering::Acquire) {
            Err(CacheError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.ensure_open()?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let is_new = !entries.contains_key(key);
        let full = is_new && entries.len() >= self.max_entries;
        let sweep_due = (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % PURGE_INTERVAL == 0;
        if full || sweep_due {
            entries.retain(|_, e| e.expires_at > now);
        }

        if is_new && entries.len() >= self.max_entries {
            let soonest = entries
                .iter()
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(k, _)| k.clone());
            if let Some(evicted) = soonest {
                tracing::debug!(key = %evicted, "Memory cache full, evicting entry");
                entries.remove(&evicted);
            }
        }

        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheError> {
        self.closed.store(true, Ordering::Release);
        self.entries.write().await.clear();
        Ok(())
    }
}

// ============================================================================
// Redis backend
// ============================================================================

/// Redis-backed cache
///
/// Uses a reconnecting connection manager; `rediss://` URLs use TLS.
pub struct RedisCache {
    connection: RwLock<Option<ConnectionManager>>,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self {
            connection: RwLock::new(Some(manager)),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        self.connection.read().await.clone().ok_or(CacheError::Closed)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheError> {
        // Dropping the last manager handle shuts the connection down.
        self.connection.write().await.take();
        Ok(())
    }
}

/// Connect the configured backend
///
/// A Redis URL that cannot be reached degrades to the in-process cache.
pub async fn connect_store(config: &CacheConfig) -> Arc<dyn CacheStore> {
    let Some(url) = config.redis_url.as_deref().filter(|u| !u.trim().is_empty()) else {
        tracing::info!("No Redis URL configured, using in-process cache");
        return Arc::new(MemoryCache::with_capacity(config.memory_max_entries));
    };

    let timeout = Duration::from_millis(config.op_timeout_ms.max(1) * 5);
    match tokio::time::timeout(timeout, RedisCache::connect(url)).await {
        Ok(Ok(cache)) => {
            tracing::info!("Connected to Redis cache");
            Arc::new(cache)
        }
        Ok(Err(e)) => {
            tracing::error!(
                error = %e,
                "Redis connection failed, falling back to in-process cache"
            );
            Arc::new(MemoryCache::with_capacity(config.memory_max_entries))
        }
        Err(_) => {
            tracing::error!(
                timeout_ms = timeout.as_millis() as u64,
                "Redis connection timed out, falling back to in-process cache"
            );
            Arc::new(MemoryCache::with_capacity(config.memory_max_entries))
        }
    }
}

// ============================================================================
// Typed, failure-tolerant facade
// ============================================================================

/// Namespaced JSON cache that never fails its caller
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    op_timeout: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration, op_timeout: Duration) -> Self {
        Self {
            store,
            ttl,
            op_timeout,
        }
    }

    pub fn from_config(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self::new(
            store,
            Duration::from_secs(config.ttl_seconds),
            Duration::from_millis(config.op_timeout_ms),
        )
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{}:{}", namespace, key)
    }

    /// Cached value, or `None` on miss, backend failure, or undecodable entry
    pub async fn get_json<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<T> {
        let full_key = Self::full_key(namespace, key);

        let raw = match tokio::time::timeout(self.op_timeout, self.store.get(&full_key)).await {
            Ok(Ok(raw)) => raw?,
            Ok(Err(e)) => {
                tracing::warn!(
                    key = %full_key,
                    error = %e,
                    "Cache read failed, proceeding without cache"
                );
                return None;
            }
            Err(_) => {
                tracing::warn!(key = %full_key, "Cache read timed out, proceeding without cache");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key = %full_key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "Ignoring undecodable cache entry");
                None
            }
        }
    }

    /// Store a value; failures are logged and ignored
    pub async fn set_json<T: Serialize + ?Sized>(&self, namespace: &str, key: &str, value: &T) {
        let full_key = Self::full_key(namespace, key);

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    key = %full_key,
                    error = %e,
                    "Cache value not serializable, skipping"
                );
                return;
            }
        };

        let write = self.store.set(&full_key, &raw, self.ttl);
        match tokio::time::timeout(self.op_timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(
                    key = %full_key,
                    error = %e,
                    "Cache write failed, proceeding without caching"
                );
            }
            Err(_) => {
                tracing::warn!(
                    key = %full_key,
                    "Cache write timed out, proceeding without caching"
                );
            }
        }
    }

    /// Close the backend
    pub async fn close(&self) {
        match self.store.close().await {
            Ok(()) => tracing::info!(backend = self.store.backend_name(), "Cache closed"),
            Err(e) => tracing::warn!(error = %e, "Cache close failed"),
        }
    }
}
