//! 인증 서브시스템의 에러 타입.
//!
//! 인증 서비스가 외부(HTTP 레이어)에 노출하는 에러 분류 체계입니다.
//! HTTP 상태 코드 선택은 호출자의 책임이며, 여기서는 분류만 담당합니다.

use thiserror::Error;

/// 인증 서비스 에러.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 이메일 형식 오류
    #[error("잘못된 이메일 주소")]
    InvalidEmail,

    /// 비밀번호 정책 위반
    #[error("비밀번호가 정책을 만족하지 않습니다")]
    WeakPassword,

    /// 사용자 이름 오류
    #[error("잘못된 사용자 이름")]
    InvalidUsername,

    /// 이미 등록된 이메일
    #[error("이미 등록된 이메일입니다")]
    EmailAlreadyExists,

    /// 비밀번호 불일치
    #[error("인증 실패")]
    AuthenticationFailed,

    /// 찾을 수 없음
    #[error("찾을 수 없음")]
    NotFound,

    /// 리프레시 토큰이 없거나 만료됨
    #[error("유효하지 않은 리프레시 토큰")]
    InvalidRefreshToken,

    /// 유효하지 않은 Access Token
    #[error("유효하지 않은 토큰")]
    InvalidToken,

    /// 요청 기한 초과 또는 취소
    #[error("요청 기한 초과")]
    DeadlineExceeded,

    /// 설정 에러 (생성 시점 전용)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 인증 작업을 위한 Result 타입.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// 안정적인 에러 코드 (응답 본문용).
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail => "INVALID_EMAIL",
            AuthError::WeakPassword => "WEAK_PASSWORD",
            AuthError::InvalidUsername => "INVALID_USERNAME",
            AuthError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AuthError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            AuthError::NotFound => "NOT_FOUND",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            AuthError::Config(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 요청 데이터 또는 자격증명 문제로 인한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AuthError::DeadlineExceeded | AuthError::Config(_) | AuthError::Internal(_)
        )
    }

    /// 입력 검증 단계의 에러인지 확인합니다.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidEmail | AuthError::WeakPassword | AuthError::InvalidUsername
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_client_classification() {
        assert!(AuthError::InvalidEmail.is_client_error());
        assert!(AuthError::InvalidRefreshToken.is_client_error());
        assert!(!AuthError::Internal("db down".to_string()).is_client_error());
        assert!(!AuthError::DeadlineExceeded.is_client_error());
    }

    #[test]
    fn test_error_validation() {
        assert!(AuthError::WeakPassword.is_validation());
        assert!(!AuthError::EmailAlreadyExists.is_validation());
    }

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            AuthError::InvalidEmail,
            AuthError::WeakPassword,
            AuthError::InvalidUsername,
            AuthError::EmailAlreadyExists,
            AuthError::AuthenticationFailed,
            AuthError::NotFound,
            AuthError::InvalidRefreshToken,
            AuthError::InvalidToken,
            AuthError::DeadlineExceeded,
            AuthError::Config(String::new()),
            AuthError::Internal(String::new()),
        ];

        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }
}
