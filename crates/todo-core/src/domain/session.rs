//! 세션 레코드와 토큰 쌍.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 영속 세션 레코드.
///
/// 리프레시 토큰과 만료 시각의 쌍입니다. 사용자 레코드에 내장되며,
/// 현재 시각이 `expires_at` 이전일 때만 유효합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(refresh_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// `now < expires_at`일 때만 유효 (경계값은 만료로 취급).
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Access Token + Refresh Token 쌍.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token (불투명 문자열)
    pub refresh_token: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}
