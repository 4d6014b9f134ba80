//! 비즈니스 서비스.
//!
//! - [`AuthService`]: 회원가입, 로그인, 토큰 갱신
//! - [`RequestContext`]: 요청 기한/취소 전파

mod auth;
mod context;

pub use auth::AuthService;
pub use context::RequestContext;
