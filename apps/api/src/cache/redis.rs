use ::redis::aio::MultiplexedConnection;
use ::redis::AsyncCommands;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use super::{CacheEntry, CacheError, CacheStore};

/// Prefix for every key this service writes to Redis.
pub const KEY_PREFIX: &str = "diagnosis_";

/// Redis-backed cache shared across service instances. The multiplexed
/// connection is opened on first use and reused afterwards.
pub struct RedisCacheStore {
    client: ::redis::Client,
    conn: OnceCell<MultiplexedConnection>,
}

impl RedisCacheStore {
    pub fn open(url: &str) -> Result<Self, CacheError> {
        Ok(Self {
            client: ::redis::Client::open(url)?,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = self.client.get_multiplexed_async_connection().await?;
                info!("Redis cache connection established");
                Ok::<_, CacheError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }
}

fn namespaced(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(namespaced(key)).await?;
        Ok(raw.map(|r| serde_json::from_str(&r)).transpose()?)
    }

    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let raw = serde_json::to_string(entry)?;
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(namespaced(key), raw).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
