//! 데이터 저장 어댑터.
//!
//! 이 crate는 `todo-core`의 협력자 trait 구현을 제공합니다:
//! - PostgreSQL 사용자 저장소 (`UserStore`)
//! - Redis 세션 캐시 (`SessionCache`)
//! - 인프라 없이 실행하기 위한 인메모리 구현

pub mod error;
pub mod storage;

pub use error::{DataError, Result};

// 저장소 타입 재내보내기
pub use storage::memory::{MemorySessionCache, MemoryUserStore};
pub use storage::postgres::{Database, PgUserStore};
pub use storage::redis::RedisCache;
