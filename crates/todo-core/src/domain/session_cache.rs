//! 세션 캐시 추상화.
//!
//! 리프레시 토큰 → 사용자 식별자 매핑을 위한 빠른 경로입니다.
//! 캐시는 힌트일 뿐이며, 미스나 장애 시 영속 저장소가 기준이 됩니다.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// SessionCache 에러.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// 캐시 미스 또는 만료
    #[error("캐시 미스")]
    NotFound,

    /// 캐시 연결 불가 (호출자는 미스로 취급해야 함)
    #[error("캐시 사용 불가: {0}")]
    Unavailable(String),
}

/// 세션 캐시 trait.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// TTL과 함께 값 저장.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 값 조회. 미스/만료 시 `CacheError::NotFound`.
    async fn get(&self, key: &str) -> Result<String, CacheError>;

    /// 키 삭제 (best-effort).
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
