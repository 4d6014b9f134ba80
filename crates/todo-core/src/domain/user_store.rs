//! 영속 사용자 저장소 추상화.
//!
//! 사용자 레코드와 내장 세션 레코드를 보관하는 저장소 인터페이스입니다.
//! PostgreSQL 구현과 인메모리 구현이 `todo-data` 크레이트에 있습니다.

use async_trait::async_trait;
use thiserror::Error;

use super::{NewUser, Session, User, UserId};

// =============================================================================
// 에러 타입
// =============================================================================

/// UserStore 에러.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// 조건을 만족하는 레코드 없음
    #[error("레코드를 찾을 수 없습니다")]
    NotFound,

    /// 이메일 고유 제약 위반
    #[error("이미 등록된 이메일입니다")]
    DuplicateEmail,

    /// 기타 저장소 에러
    #[error("저장소 에러: {0}")]
    Storage(String),
}

// =============================================================================
// UserStore Trait
// =============================================================================

/// 사용자 저장소 trait.
///
/// 구현체는 프로세스 시작 시 한 번 생성되어 모든 요청이 공유하므로
/// `Send + Sync`여야 합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 사용자 생성.
    ///
    /// 저장소가 발급한 식별자가 채워진 레코드를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateEmail`: 이메일 고유 제약 위반
    /// - `StoreError::Storage`: 기타 저장소 에러
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// 이메일로 사용자 조회.
    async fn find_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// 식별자로 사용자 조회.
    async fn find_by_id(&self, id: UserId) -> Result<User, StoreError>;

    /// 유효한 리프레시 토큰으로 사용자 조회.
    ///
    /// 토큰 일치 **그리고** `expires_at > now` 조건을 저장소 측에서 함께
    /// 검사해야 합니다. 둘 중 하나라도 만족하지 않으면 `StoreError::NotFound`.
    async fn find_by_valid_refresh_token(&self, token: &str) -> Result<User, StoreError>;

    /// 사용자의 세션 레코드를 덮어씁니다.
    ///
    /// 사용자가 더 이상 존재하지 않으면 `StoreError::NotFound`.
    async fn set_session(&self, user_id: UserId, session: Session) -> Result<(), StoreError>;
}
