use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheEntry, CacheError, CacheStore};

/// In-process cache. Entries are kept as serialized JSON so a hit hands back
/// exactly what was stored.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryCacheStore {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(CacheError::from)
    }

    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let raw = serde_json::to_string(entry)?;
        self.entries.write().await.insert(key.to_string(), raw);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
