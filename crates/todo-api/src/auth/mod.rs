//! 인증 구성 요소.
//!
//! - [`TokenManager`]: Access Token 발급/검증, 불투명 Refresh Token 생성
//! - [`PasswordHasher`]: 비밀번호 해시/비교 (기본 구현 [`Argon2Hasher`])
//! - 요청 입력 검증 ([`SignUpRequest`], [`SignInRequest`])
//! - [`AuthUser`]: Bearer 토큰 인증 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(AuthUser(user_id): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user_id)
//! }
//! ```

mod jwt;
mod middleware;
mod password;
mod validation;

pub use jwt::{Claims, JwtError, TokenManager};
pub use middleware::{AuthRejection, AuthUser};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use validation::{RefreshRequest, SignInRequest, SignUpRequest};
