//! 인증 서비스.
//!
//! 회원가입, 로그인, 토큰 갱신을 조율합니다. 서비스 자체는 상태가 없으며
//! 생성 시 주입된 협력자(저장소, 캐시, 해시기, 토큰 발급기)만 보유합니다.
//!
//! # 세션 발급 순서
//!
//! 1. Access Token 발급
//! 2. 불투명 Refresh Token 생성
//! 3. 캐시 기록 (`refresh_token → user_id`, TTL = Access TTL × 2)
//! 4. 영속 세션 기록 (`expires_at = now + Refresh TTL`)
//!
//! 캐시 기록은 항상 영속 기록보다 먼저 수행됩니다.
//! 캐시 기록 실패 처리는 [`CacheWritePolicy`]를 따릅니다.
//!
//! # 토큰 갱신
//!
//! 캐시를 먼저 조회하고, 미스나 장애 시 영속 저장소에서 만료되지 않은
//! 세션을 찾습니다. 동일 사용자에 대한 동시 갱신은 마지막 기록이 남습니다.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use todo_core::{
    AuthError, AuthResult, CacheError, CacheWritePolicy, NewUser, Session, SessionCache,
    SessionConfig, StoreError, TokenPair, UserId, UserProfile, UserStore,
};
use tracing::{debug, info, instrument, warn};

use super::RequestContext;
use crate::auth::{
    Argon2Hasher, PasswordError, PasswordHasher, SignInRequest, SignUpRequest, TokenManager,
};

/// 인증 서비스.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn SessionCache>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenManager,
    access_ttl: Duration,
    /// 응답의 `expires_in` (초)
    expires_in: i64,
    refresh_ttl: chrono::Duration,
    cache_ttl: Duration,
    cache_policy: CacheWritePolicy,
}

impl AuthService {
    /// 설정과 협력자로 서비스를 생성합니다.
    ///
    /// 서명 키를 사용할 수 없거나 TTL로 만료 시각을 계산할 수 없으면
    /// [`AuthError::Config`]를 반환합니다.
    pub fn new(
        config: &SessionConfig,
        store: Arc<dyn UserStore>,
        cache: Arc<dyn SessionCache>,
    ) -> AuthResult<Self> {
        let tokens = TokenManager::new(&config.signing_key)?;

        let access_ttl = config.access_token_ttl();
        if access_ttl.is_zero() {
            return Err(AuthError::Config(
                "access_token_ttl_secs must be positive".to_string(),
            ));
        }
        expiry_offset("access_token_ttl_secs", access_ttl)?;
        let expires_in = i64::try_from(access_ttl.as_secs())
            .map_err(|_| AuthError::Config("access_token_ttl_secs is out of range".to_string()))?;
        let cache_ttl = config.cache_ttl().ok_or_else(|| {
            AuthError::Config("access_token_ttl_secs is out of range for the session cache".to_string())
        })?;

        let refresh_ttl = expiry_offset("refresh_token_ttl_secs", config.refresh_token_ttl())?;

        Ok(Self {
            store,
            cache,
            hasher: Arc::new(Argon2Hasher::new()),
            tokens,
            access_ttl,
            expires_in,
            refresh_ttl,
            cache_ttl,
            cache_policy: config.cache_write_policy,
        })
    }

    /// 비밀번호 해시기를 교체합니다.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn cache_policy(&self) -> CacheWritePolicy {
        self.cache_policy
    }

    /// 새 사용자를 등록합니다.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn sign_up(
        &self,
        ctx: &RequestContext,
        request: SignUpRequest,
    ) -> AuthResult<UserProfile> {
        request.check()?;

        match ctx.run(self.store.find_by_email(&request.email)).await? {
            Ok(_) => return Err(AuthError::EmailAlreadyExists),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(internal(e)),
        }

        let hasher = Arc::clone(&self.hasher);
        let password = request.password;
        let password_hash = ctx
            .run(tokio::task::spawn_blocking(move || hasher.hash(&password)))
            .await?
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))??;

        let new_user = NewUser {
            username: request.username.trim().to_string(),
            email: request.email,
            password_hash,
            created_at: Utc::now(),
        };

        let user = ctx
            .run(self.store.create_user(new_user))
            .await?
            .map_err(|e| match e {
                // 조회 이후 동시 가입 경합
                StoreError::DuplicateEmail => AuthError::EmailAlreadyExists,
                other => internal(other),
            })?;

        info!(user_id = %user.id, "user signed up");
        Ok(user.profile())
    }

    /// 이메일/비밀번호로 로그인하고 새 세션을 발급합니다.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn sign_in(&self, ctx: &RequestContext, request: SignInRequest) -> AuthResult<TokenPair> {
        request.check()?;

        let user = ctx
            .run(self.store.find_by_email(&request.email))
            .await?
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::NotFound,
                other => internal(other),
            })?;

        let hasher = Arc::clone(&self.hasher);
        let digest = user.password_hash.clone();
        let password = request.password;
        ctx.run(tokio::task::spawn_blocking(move || {
            hasher.compare(&digest, &password)
        }))
        .await?
        .map_err(|e| AuthError::Internal(format!("password task failed: {e}")))?
        .map_err(|e| {
            if e == PasswordError::InvalidHashFormat {
                warn!(user_id = %user.id, "stored password hash is corrupt");
            }
            AuthError::from(e)
        })?;

        let pair = self.issue_session(ctx, user.id).await?;
        info!(user_id = %user.id, "user signed in");
        Ok(pair)
    }

    /// Refresh Token으로 새 토큰 쌍을 발급합니다.
    #[instrument(skip_all)]
    pub async fn refresh_tokens(
        &self,
        ctx: &RequestContext,
        refresh_token: &str,
    ) -> AuthResult<TokenPair> {
        let user_id = match self.resolve_from_cache(ctx, refresh_token).await? {
            Some(user_id) => user_id,
            None => {
                ctx.run(self.store.find_by_valid_refresh_token(refresh_token))
                    .await?
                    .map_err(|e| match e {
                        StoreError::NotFound => AuthError::InvalidRefreshToken,
                        other => internal(other),
                    })?
                    .id
            }
        };

        let pair = self.issue_session(ctx, user_id).await?;

        // 소비된 토큰이 캐시 경로로 다시 해석되지 않도록 제거
        match ctx.run(self.cache.delete(refresh_token)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "failed to evict consumed refresh token"),
            Err(e) => warn!(error = %e, "eviction of consumed refresh token skipped"),
        }

        debug!(user_id = %user_id, "tokens refreshed");
        Ok(pair)
    }

    /// 인증된 사용자의 공개 정보를 조회합니다.
    pub async fn profile(&self, ctx: &RequestContext, user_id: UserId) -> AuthResult<UserProfile> {
        ctx.run(self.store.find_by_id(user_id))
            .await?
            .map(|user| user.profile())
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::NotFound,
                other => internal(other),
            })
    }

    /// Access Token을 검증하고 사용자 식별자를 반환합니다.
    pub fn authenticate(&self, access_token: &str) -> AuthResult<UserId> {
        let subject = self.tokens.verify(access_token)?;
        subject.parse().map_err(|_| AuthError::InvalidToken)
    }

    /// 캐시 빠른 경로. 미스, 장애, 손상된 값은 모두 `None`.
    async fn resolve_from_cache(
        &self,
        ctx: &RequestContext,
        refresh_token: &str,
    ) -> AuthResult<Option<UserId>> {
        match ctx.run(self.cache.get(refresh_token)).await? {
            Ok(value) => match value.parse::<UserId>() {
                Ok(user_id) => Ok(Some(user_id)),
                Err(_) => {
                    warn!("session cache holds a malformed user id");
                    Ok(None)
                }
            },
            Err(CacheError::NotFound) => Ok(None),
            Err(CacheError::Unavailable(e)) => {
                warn!(error = %e, "session cache unavailable, falling back to store");
                Ok(None)
            }
        }
    }

    /// 로그인과 갱신이 공유하는 세션 발급.
    async fn issue_session(&self, ctx: &RequestContext, user_id: UserId) -> AuthResult<TokenPair> {
        let subject = user_id.to_string();
        let access_token = self.tokens.issue(&subject, self.access_ttl)?;
        let refresh_token = self.tokens.issue_opaque()?;

        if let Err(e) = ctx
            .run(self.cache.set(&refresh_token, &subject, self.cache_ttl))
            .await?
        {
            match self.cache_policy {
                CacheWritePolicy::Fatal => {
                    return Err(AuthError::Internal(format!("session cache write: {e}")))
                }
                CacheWritePolicy::BestEffort => {
                    warn!(user_id = %user_id, error = %e, "session cache write failed, continuing");
                }
            }
        }

        let expires_at = Utc::now()
            .checked_add_signed(self.refresh_ttl)
            .ok_or_else(|| AuthError::Internal("refresh expiry out of range".to_string()))?;
        ctx.run(
            self.store
                .set_session(user_id, Session::new(refresh_token.clone(), expires_at)),
        )
        .await?
        .map_err(|e| match e {
            StoreError::NotFound => AuthError::NotFound,
            other => internal(other),
        })?;

        Ok(TokenPair::bearer(access_token, refresh_token, self.expires_in))
    }
}

/// 현재 시각에 더할 수 있는 TTL인지 확인합니다.
fn expiry_offset(name: &str, ttl: Duration) -> AuthResult<chrono::Duration> {
    chrono::Duration::from_std(ttl)
        .ok()
        .filter(|offset| Utc::now().checked_add_signed(*offset).is_some())
        .ok_or_else(|| AuthError::Config(format!("{name} is out of range")))
}

fn internal(err: StoreError) -> AuthError {
    AuthError::Internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_data::{MemorySessionCache, MemoryUserStore};

    const TEST_SECRET: &str = "test-secret-key-for-auth-service";

    fn service() -> (AuthService, MemoryUserStore, MemorySessionCache) {
        let store = MemoryUserStore::new();
        let cache = MemorySessionCache::new();
        let service = AuthService::new(
            &SessionConfig::new(TEST_SECRET),
            Arc::new(store.clone()),
            Arc::new(cache.clone()),
        )
        .unwrap();
        (service, store, cache)
    }

    fn alice() -> SignUpRequest {
        SignUpRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    fn alice_sign_in(password: &str) -> SignInRequest {
        SignInRequest {
            email: "alice@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_new_rejects_blank_key() {
        let result = AuthService::new(
            &SessionConfig::new("  "),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemorySessionCache::new()),
        );
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    fn service_with(config: SessionConfig) -> AuthResult<AuthService> {
        AuthService::new(
            &config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemorySessionCache::new()),
        )
    }

    #[test]
    fn test_new_rejects_refresh_ttl_past_calendar_range() {
        let mut config = SessionConfig::new(TEST_SECRET);
        config.refresh_token_ttl_secs = 10_000_000_000_000;
        assert!(matches!(service_with(config), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_new_rejects_access_ttl_overflow() {
        let mut config = SessionConfig::new(TEST_SECRET);
        config.access_token_ttl_secs = u64::MAX;
        assert!(matches!(service_with(config), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_new_rejects_access_ttl_past_calendar_range() {
        let mut config = SessionConfig::new(TEST_SECRET);
        config.access_token_ttl_secs = i64::MAX as u64;
        assert!(matches!(service_with(config), Err(AuthError::Config(_))));
    }

    #[tokio::test]
    async fn test_long_refresh_ttl_still_issues_session() {
        let mut config = SessionConfig::new(TEST_SECRET);
        // 약 100년
        config.refresh_token_ttl_secs = 100 * 365 * 24 * 3600;
        config.access_token_ttl_secs = 3600;
        let service = service_with(config).unwrap();
        let ctx = RequestContext::background();

        service.sign_up(&ctx, alice()).await.unwrap();
        let pair = service.sign_in(&ctx, alice_sign_in("secret1")).await.unwrap();
        assert_eq!(pair.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_sign_up_stores_hash_not_plaintext() {
        let (service, store, _) = service();
        let ctx = RequestContext::background();

        let profile = service.sign_up(&ctx, alice()).await.unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email, "alice@example.com");

        let stored = store.find_by_id(profile.id).await.unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(stored.session.is_none());
    }

    #[tokio::test]
    async fn test_sign_up_trims_username() {
        let (service, _, _) = service();
        let mut request = alice();
        request.username = "  alice  ".to_string();

        let profile = service
            .sign_up(&RequestContext::background(), request)
            .await
            .unwrap();
        assert_eq!(profile.username, "alice");
    }

    #[tokio::test]
    async fn test_sign_in_then_refresh_rotates_token() {
        let (service, _, _) = service();
        let ctx = RequestContext::background();
        service.sign_up(&ctx, alice()).await.unwrap();

        let first = service.sign_in(&ctx, alice_sign_in("secret1")).await.unwrap();
        assert!(!first.access_token.is_empty());
        assert_eq!(first.token_type, "Bearer");
        assert_eq!(first.expires_in, 900);

        let second = service
            .refresh_tokens(&ctx, &first.refresh_token)
            .await
            .unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        let again = service.refresh_tokens(&ctx, &first.refresh_token).await;
        assert_eq!(again.unwrap_err(), AuthError::InvalidRefreshToken);
    }

    #[tokio::test]
    async fn test_authenticate_and_profile() {
        let (service, _, _) = service();
        let ctx = RequestContext::background();
        let created = service.sign_up(&ctx, alice()).await.unwrap();
        let pair = service.sign_in(&ctx, alice_sign_in("secret1")).await.unwrap();

        let user_id = service.authenticate(&pair.access_token).unwrap();
        assert_eq!(user_id, created.id);

        let profile = service.profile(&ctx, user_id).await.unwrap();
        assert_eq!(profile, created);

        assert_eq!(
            service.authenticate(&pair.refresh_token).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn test_profile_unknown_user() {
        let (service, _, _) = service();
        let result = service
            .profile(&RequestContext::background(), UserId::new_v4())
            .await;
        assert_eq!(result.unwrap_err(), AuthError::NotFound);
    }

    #[tokio::test]
    async fn test_refresh_falls_back_to_store_on_cache_miss() {
        let (service, _, cache) = service();
        let ctx = RequestContext::background();
        service.sign_up(&ctx, alice()).await.unwrap();
        let pair = service.sign_in(&ctx, alice_sign_in("secret1")).await.unwrap();

        cache.delete(&pair.refresh_token).await.unwrap();

        let refreshed = service.refresh_tokens(&ctx, &pair.refresh_token).await.unwrap();
        assert_ne!(refreshed.refresh_token, pair.refresh_token);
    }

    #[tokio::test]
    async fn test_malformed_cache_value_falls_back_to_store() {
        let (service, _, cache) = service();
        let ctx = RequestContext::background();
        service.sign_up(&ctx, alice()).await.unwrap();
        let pair = service.sign_in(&ctx, alice_sign_in("secret1")).await.unwrap();

        cache
            .set(&pair.refresh_token, "not-a-uuid", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(service.refresh_tokens(&ctx, &pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_unknown_token() {
        let (service, _, _) = service();
        let result = service
            .refresh_tokens(&RequestContext::background(), "nope")
            .await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidRefreshToken);
    }
}
