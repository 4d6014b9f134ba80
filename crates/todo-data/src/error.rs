//! 데이터 모듈 오류 타입.

use thiserror::Error;
use todo_core::{CacheError, StoreError};

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 캐시 오류
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 캐시 미스
    #[error("Cache miss: {0}")]
    CacheMiss(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        DataError::CacheError(err.to_string())
    }
}

/// 어댑터 내부 오류를 저장소 계약의 오류로 분류합니다.
impl From<DataError> for StoreError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(_) => StoreError::NotFound,
            DataError::DuplicateError(_) => StoreError::DuplicateEmail,
            other => StoreError::Storage(other.to_string()),
        }
    }
}

impl From<DataError> for CacheError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::CacheMiss(_) => CacheError::NotFound,
            other => CacheError::Unavailable(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
