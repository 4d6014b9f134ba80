//! 프로세스 내 메모리 저장소.
//!
//! 외부 인프라 없이 서비스를 띄우거나 테스트할 때 사용합니다.
//! 재시작하면 모든 데이터가 사라집니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use todo_core::{CacheError, NewUser, Session, SessionCache, StoreError, User, UserId, UserStore};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// 메모리 기반 [`UserStore`].
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 주어진 시각 기준으로 유효한 세션을 가진 사용자를 찾습니다.
    pub async fn find_valid_at(&self, token: &str, now: DateTime<Utc>) -> Result<User, StoreError> {
        let users = self.users.read().await;
        users
            .values()
            .find(|user| {
                user.session
                    .as_ref()
                    .is_some_and(|s| s.refresh_token == token && s.is_valid_at(now))
            })
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// 저장된 사용자 수. 테스트 검사용이며 [`UserStore`] 계약에 속하지 않습니다.
    #[doc(hidden)]
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    #[doc(hidden)]
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        // 검사와 삽입을 같은 쓰기 락 안에서 수행
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = user.into_user(UserId::new_v4());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        let users = self.users.read().await;
        users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, StoreError> {
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn find_by_valid_refresh_token(&self, token: &str) -> Result<User, StoreError> {
        self.find_valid_at(token, Utc::now()).await
    }

    async fn set_session(&self, user_id: UserId, session: Session) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.session = Some(session);
        Ok(())
    }
}

/// 메모리 기반 [`SessionCache`].
///
/// 만료 시각은 tokio 시계를 사용하므로 `tokio::time::pause`로 제어할 수 있습니다.
#[derive(Clone, Default)]
pub struct MemorySessionCache {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 만료되지 않은 항목 수. 테스트 검사용입니다.
    #[doc(hidden)]
    pub async fn live_entries(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|(_, deadline)| *deadline > now).count()
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let deadline = Instant::now() + ttl;
        let mut entries = self.entries.write().await;

        // 만료 항목 정리
        let now = Instant::now();
        entries.retain(|_, (_, d)| *d > now);

        entries.insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, CacheError> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Ok(value.clone()),
            _ => Err(CacheError::NotFound),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
