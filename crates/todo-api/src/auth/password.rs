//! 비밀번호 해싱.
//!
//! Argon2 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2,
};
use todo_core::AuthError;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 불일치")]
    Mismatch,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Mismatch => AuthError::AuthenticationFailed,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

/// 비밀번호 해시/비교.
///
/// CPU 집약적인 작업이므로 호출자는 blocking 스레드에서 실행해야 합니다.
pub trait PasswordHasher: Send + Sync + 'static {
    /// 평문 비밀번호를 솔트 포함 단방향 해시로 변환합니다.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// 저장된 해시와 평문이 일치하면 `Ok(())`.
    fn compare(&self, digest: &str, plaintext: &str) -> Result<(), PasswordError>;
}

/// Argon2id 구현 (PHC 문자열 형식).
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| PasswordError::HashingFailed)?;

        Ok(hash.to_string())
    }

    fn compare(&self, digest: &str, plaintext: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(digest).map_err(|_| PasswordError::InvalidHashFormat)?;

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .map_err(|e| match e {
                argon2::password_hash::Error::Password => PasswordError::Mismatch,
                _ => PasswordError::InvalidHashFormat,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_compare() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("secret1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "secret1");
        assert!(hasher.compare(&hash, "secret1").is_ok());
        assert_eq!(
            hasher.compare(&hash, "secret2").unwrap_err(),
            PasswordError::Mismatch
        );
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = Argon2Hasher::new();
        let a = hasher.hash("Password1").unwrap();
        let b = hasher.hash("Password1").unwrap();

        // 솔트가 다르므로 해시도 다름
        assert_ne!(a, b);
        assert!(hasher.compare(&a, "Password1").is_ok());
        assert!(hasher.compare(&b, "Password1").is_ok());
    }

    #[test]
    fn test_corrupt_digest_is_internal() {
        let hasher = Argon2Hasher::new();
        let err = hasher.compare("not-a-valid-hash", "password").unwrap_err();

        assert_eq!(err, PasswordError::InvalidHashFormat);
        assert!(matches!(AuthError::from(err), AuthError::Internal(_)));
    }

    #[test]
    fn test_mismatch_maps_to_authentication_failed() {
        assert_eq!(
            AuthError::from(PasswordError::Mismatch),
            AuthError::AuthenticationFailed
        );
    }

    #[test]
    fn test_unicode_password() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("한글패스워드123").unwrap();
        assert!(hasher.compare(&hash, "한글패스워드123").is_ok());
    }
}
