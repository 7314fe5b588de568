//! Redis implementation of ConversationLog.

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use concierge_core::{traits::ConversationLog, types::TurnRecord, Error, Result};

/// Redis-backed conversation log. Each session is a list of JSON turn records.
pub struct RedisConversationLog {
    client: Client,
    prefix: String,
    ttl_seconds: i64,
}

impl RedisConversationLog {
    /// Create a new Redis conversation log.
    pub fn new(url: &str, prefix: &str, ttl_seconds: u64) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| Error::storage(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
        })
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}:{}", self.prefix, session_id)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::storage(format!("Redis connection error: {}", e)))
    }
}

#[async_trait]
impl ConversationLog for RedisConversationLog {
    async fn append(&self, record: TurnRecord) -> Result<()> {
        let mut conn = self.connection().await?;
        let key = self.key(&record.session_id);
        let json = serde_json::to_string(&record)
            .map_err(|e| Error::storage(format!("Failed to serialize turn record: {}", e)))?;

        let _: () = conn
            .rpush(&key, json)
            .await
            .map_err(|e| Error::storage(format!("Redis rpush error: {}", e)))?;

        // Refresh TTL on every turn
        if self.ttl_seconds > 0 {
            let _: () = conn
                .expire(&key, self.ttl_seconds)
                .await
                .map_err(|e| Error::storage(format!("Redis expire error: {}", e)))?;
        }

        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<TurnRecord>> {
        let mut conn = self.connection().await?;
        let entries: Vec<String> = conn
            .lrange(self.key(session_id), 0, -1)
            .await
            .map_err(|e| Error::storage(format!("Redis lrange error: {}", e)))?;

        entries
            .iter()
            .map(|json| {
                serde_json::from_str(json)
                    .map_err(|e| Error::storage(format!("Failed to deserialize turn record: {}", e)))
            })
            .collect()
    }
}
