//! Redis service for visit counters

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service. No connection is opened until first use.
    pub fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        Ok(Self { client })
    }

    /// Check that the server answers
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(())
    }

    /// Count one more visit for `visitor` and return the new total
    pub async fn record_visit(&self, visitor: &str) -> AppResult<i64> {
        let mut conn = self.connection().await?;

        let key = format!("visits:{}", visitor);
        let visits: i64 = conn
            .incr(&key, 1)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to count visit in Redis: {}", e)))?;

        Ok(visits)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}
