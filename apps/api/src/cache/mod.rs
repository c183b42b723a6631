//! Content-addressed report cache.
//!
//! Key: `hex(sha256(content_text ++ model_id))` over the exact text sent to the
//! Extractor. Entries never expire; lookups are exact-match only.
//! Backends: in-process map (default) and Redis (when `REDIS_URL` is set).

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::report::FinalReport;

pub use self::memory::MemoryCacheStore;
pub use self::redis::RedisCacheStore;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Stored entry is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A stored report plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub report: FinalReport,
    pub model_id: String,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(report: FinalReport, model_id: &str) -> Self {
        Self {
            report,
            model_id: model_id.to_string(),
            stored_at: Utc::now(),
        }
    }
}

/// Storage seam for analysis results. Implementations must tolerate concurrent
/// `get`/`put`; a `put` always writes a complete entry, so last writer wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError>;

    fn backend(&self) -> &'static str;
}

/// Derives the cache key for `content_text` analysed by `model_id`.
pub fn cache_key(content_text: &str, model_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content_text.as_bytes());
    hasher.update(model_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when `key` has the shape `cache_key` produces.
pub fn is_valid_key(key: &str) -> bool {
    key.len() == 64 && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
