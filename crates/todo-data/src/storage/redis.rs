//! Redis 세션 캐시 구현.
//!
//! 리프레시 토큰 → 사용자 식별자 매핑을 `session:{token}` 키로 저장합니다.
//! 값은 사용자 식별자 문자열 그대로이며 만료는 Redis TTL에 맡깁니다.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::time::Duration;
use todo_core::{CacheError, RedisConfig, SessionCache};
use tracing::{debug, info, instrument, warn};

/// 세션 캐시 키 접두사.
const KEY_PREFIX: &str = "session:";

/// Redis 연결 래퍼.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    /// 새로운 Redis 연결을 생성합니다.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        info!("Connecting to Redis...");

        let client = Client::open(config.url.as_str())?;

        let connection = tokio::time::timeout(
            Duration::from_secs(config.connection_timeout_secs),
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| DataError::ConnectionError("Redis connection timed out".to_string()))??;

        info!("Redis connection established");

        Ok(Self { connection })
    }

    /// Redis 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection.clone();
        let result: String = redis::cmd("PING").query_async(&mut conn).await?;

        Ok(result == "PONG")
    }

    fn session_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl SessionCache for RedisCache {
    #[instrument(skip_all)]
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> std::result::Result<(), CacheError> {
        // SETEX는 0초 TTL을 거부하므로 최소 1초
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(Self::session_key(key), value, ttl_secs)
            .await
            .map_err(|e| {
                warn!(error = %e, "session cache write failed");
                CacheError::from(DataError::from(e))
            })?;

        Ok(())
    }

    #[instrument(skip_all)]
    async fn get(&self, key: &str) -> std::result::Result<String, CacheError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn
            .get(Self::session_key(key))
            .await
            .map_err(|e| CacheError::from(DataError::from(e)))?;

        match value {
            Some(user_id) => Ok(user_id),
            None => {
                debug!("session cache miss");
                Err(CacheError::NotFound)
            }
        }
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _deleted: i64 = conn
            .del(Self::session_key(key))
            .await
            .map_err(|e| CacheError::from(DataError::from(e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `REDIS_URL`이 가리키는 Redis가 필요합니다.
    async fn test_cache() -> RedisCache {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379/0".into());
        RedisCache::connect(&RedisConfig {
            url,
            connection_timeout_secs: 2,
        })
        .await
        .unwrap()
    }

    #[test]
    fn test_session_key_prefix() {
        assert_eq!(RedisCache::session_key("abc"), "session:abc");
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_delete() {
        let cache = test_cache().await;
        let key = format!("test-{}", uuid::Uuid::new_v4());

        cache.set(&key, "user-1", Duration::from_secs(30)).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), "user-1");

        cache.delete(&key).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap_err(), CacheError::NotFound);
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_health_check() {
        let cache = test_cache().await;
        assert!(cache.health_check().await.unwrap());
    }
}
