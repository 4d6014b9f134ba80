//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다.
//! 저장소/캐시 연결은 프로세스 시작 시 한 번 생성되며 요청마다 만들지 않습니다.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use todo_data::{Database, RedisCache};
use tokio_util::sync::CancellationToken;

use crate::services::{AuthService, RequestContext};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 인증 서비스
    pub auth: Arc<AuthService>,

    /// 데이터베이스 (memory 백엔드에서는 None)
    pub database: Option<Database>,

    /// Redis 캐시 (memory 백엔드에서는 None)
    pub redis: Option<RedisCache>,

    /// 요청당 처리 기한
    pub request_timeout: Duration,

    /// 서버 종료 토큰 (진행 중 요청에 취소 전파)
    pub shutdown: CancellationToken,

    /// API 버전
    pub version: String,

    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, request_timeout: Duration) -> Self {
        Self {
            auth,
            database: None,
            redis: None,
            request_timeout,
            shutdown: CancellationToken::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    #[must_use]
    pub fn with_redis(mut self, redis: RedisCache) -> Self {
        self.redis = Some(redis);
        self
    }

    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// 새 요청용 컨텍스트 (기한 = 현재 + request_timeout, 종료 시 취소).
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout).with_cancel(self.shutdown.child_token())
    }

    pub async fn is_db_healthy(&self) -> bool {
        match &self.database {
            Some(db) => db.health_check().await.unwrap_or(false),
            None => false,
        }
    }

    pub async fn is_redis_healthy(&self) -> bool {
        match &self.redis {
            Some(redis) => redis.health_check().await.unwrap_or(false),
            None => false,
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 상태 (인메모리 저장소/캐시).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use todo_core::SessionConfig;
    use todo_data::{MemorySessionCache, MemoryUserStore};

    let auth = AuthService::new(
        &SessionConfig::new("test-secret-key-for-todo-api-state"),
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemorySessionCache::new()),
    )
    .expect("test session config is valid");

    AppState::new(Arc::new(auth), Duration::from_secs(5))
}
