//! 인증 요청 입력 검증.
//!
//! 검증은 저장소/캐시 I/O 전에 수행되며, 여러 필드가 동시에 잘못된 경우
//! 이메일 → 비밀번호 → 사용자 이름 순서로 첫 번째 에러를 보고합니다.

use serde::Deserialize;
use todo_core::{AuthError, AuthResult};
use validator::{Validate, ValidationError, ValidationErrors};

/// 비밀번호 최소 길이 (문자 수).
pub const MIN_PASSWORD_LEN: u64 = 6;
/// 사용자 이름 길이 범위 (앞뒤 공백 제외).
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 64;

/// 회원가입 요청.
#[derive(Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = "MIN_PASSWORD_LEN"))]
    pub password: String,
}

/// 로그인 요청.
#[derive(Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = "MIN_PASSWORD_LEN"))]
    pub password: String,
}

/// 토큰 갱신 요청.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// 비밀번호가 Debug 출력에 섞이지 않도록 수동 구현
impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.trim().chars().count();
    if (MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("username_length"))
    }
}

/// 필드 에러를 고정된 우선순위로 분류합니다.
fn classify(errors: &ValidationErrors) -> AuthError {
    let fields = errors.field_errors();
    if fields.contains_key("email") {
        AuthError::InvalidEmail
    } else if fields.contains_key("password") {
        AuthError::WeakPassword
    } else {
        AuthError::InvalidUsername
    }
}

impl SignUpRequest {
    pub fn check(&self) -> AuthResult<()> {
        self.validate().map_err(|e| classify(&e))
    }
}

impl SignInRequest {
    pub fn check(&self) -> AuthResult<()> {
        self.validate().map_err(|e| classify(&e))
    }
}
