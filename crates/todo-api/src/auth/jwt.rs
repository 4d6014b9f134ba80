//! JWT 토큰 처리.
//!
//! Access Token(HS256 JWT) 발급/검증과 불투명 Refresh Token 생성.
//! Refresh Token에는 클레임이 없으며, 의미는 세션 레코드와 캐시에만 존재합니다.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use todo_core::AuthError;

/// Refresh Token 원본 바이트 수.
const OPAQUE_TOKEN_BYTES: usize = 32;

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    pub jti: String,
}

/// 토큰 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("서명 키가 비어 있습니다")]
    EmptyKey,
    #[error("토큰 유효 시간이 범위를 벗어났습니다")]
    InvalidTtl,
    #[error("토큰 서명 실패: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("난수 생성 실패: {0}")]
    RandomSource(String),
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EmptyKey => AuthError::Config(err.to_string()),
            JwtError::TokenExpired | JwtError::InvalidToken => AuthError::InvalidToken,
            JwtError::InvalidTtl | JwtError::Signing(_) | JwtError::RandomSource(_) => {
                AuthError::Internal(err.to_string())
            }
        }
    }
}

/// 토큰 발급기.
///
/// 서명 키는 생성 시점에 고정되며 이후 변경되지 않습니다.
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager").finish_non_exhaustive()
    }
}

impl TokenManager {
    /// 서명 키로 토큰 발급기를 생성합니다.
    ///
    /// 키가 비어 있거나 공백뿐이면 [`JwtError::EmptyKey`]를 반환합니다.
    pub fn new(signing_key: &SecretString) -> Result<Self, JwtError> {
        let key = signing_key.expose_secret();
        if key.trim().is_empty() {
            return Err(JwtError::EmptyKey);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        })
    }

    /// `subject`에 대한 Access Token을 발급합니다 (만료 = 현재 + ttl).
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| JwtError::InvalidTtl)?;
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).ok_or(JwtError::InvalidTtl)?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        self.sign(&claims)
    }

    /// 불투명 Refresh Token을 생성합니다.
    ///
    /// OS 난수 32바이트를 패딩 없는 URL-safe base64로 인코딩합니다.
    pub fn issue_opaque(&self) -> Result<String, JwtError> {
        let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| JwtError::RandomSource(e.to_string()))?;

        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Access Token을 검증하고 subject를 반환합니다.
    pub fn verify(&self, token: &str) -> Result<String, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(JwtError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn manager(secret: &str) -> TokenManager {
        TokenManager::new(&SecretString::from(secret.to_string())).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = manager(TEST_SECRET);
        let token = tokens.issue("user123", Duration::from_secs(60)).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), "user123");
    }

    #[test]
    fn test_empty_key_rejected() {
        for key in ["", "   "] {
            let result = TokenManager::new(&SecretString::from(key.to_string()));
            assert!(matches!(result, Err(JwtError::EmptyKey)));
        }
        assert!(matches!(
            AuthError::from(JwtError::EmptyKey),
            AuthError::Config(_)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = manager(TEST_SECRET);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user123".to_string(),
            iat: now - 120,
            exp: now - 60,
            jti: "expired".to_string(),
        };
        let token = tokens.sign(&claims).unwrap();

        assert!(matches!(tokens.verify(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret() {
        let token = manager(TEST_SECRET)
            .issue("user123", Duration::from_secs(60))
            .unwrap();

        let result = manager("wrong-secret-key-for-testing-minimum-32-chars").verify(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_malformed_token() {
        let tokens = manager(TEST_SECRET);
        assert!(tokens.verify("invalid.token.here").is_err());
        assert!(tokens.verify("").is_err());
    }

    #[test]
    fn test_opaque_tokens_are_unique_and_url_safe() {
        let tokens = manager(TEST_SECRET);
        let a = tokens.issue_opaque().unwrap();
        let b = tokens.issue_opaque().unwrap();

        assert_ne!(a, b);
        // 32바이트 → 패딩 없는 base64 43자
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_unique_jti_per_issue() {
        let tokens = manager(TEST_SECRET);
        let a = tokens.issue("u", Duration::from_secs(60)).unwrap();
        let b = tokens.issue("u", Duration::from_secs(60)).unwrap();
        assert_ne!(a, b);
    }
}
