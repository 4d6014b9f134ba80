//! # Todo API
//!
//! 할 일 관리 서비스의 인증 서브시스템과 REST API 서버.
//!
//! - [`services::AuthService`]: 회원가입, 로그인, 토큰 갱신
//! - [`auth`]: 토큰 발급/검증, 비밀번호 해싱, 입력 검증, 인증 추출기
//! - [`routes`]: HTTP 라우터

pub mod auth;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use services::{AuthService, RequestContext};
pub use state::AppState;
