//! 사용자 도메인 타입.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Session;

/// 사용자 식별자.
///
/// 저장소가 사용자 생성 시 발급하는 불투명 식별자입니다.
/// 토큰의 `sub` 클레임과 캐시 값에는 문자열 표현이 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx-support", sqlx(transparent))]
pub struct UserId(Uuid);

impl UserId {
    /// 새 무작위 식별자 생성 (인메모리 저장소용).
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// 내부 UUID 반환.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// 저장소에 보관된 사용자 레코드.
///
/// `session`은 사용자당 최대 하나인 영속 세션 레코드입니다.
/// 새 세션 발급 시 이전 값을 덮어씁니다.
#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// 단방향 해시 (평문 비밀번호는 절대 저장하지 않음)
    pub password_hash: String,
    pub session: Option<Session>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 외부에 노출 가능한 사용자 정보.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("has_session", &self.session.is_some())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// 사용자 생성 입력.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// 저장소가 발급한 식별자로 레코드를 완성합니다.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            session: None,
            created_at: self.created_at,
        }
    }
}

/// 외부 응답용 사용자 정보 (비밀번호 해시 제외).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}
