//! Axum용 Bearer 토큰 인증 추출기.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use todo_core::UserId;

use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 인증된 사용자 식별자.
///
/// ```rust,ignore
/// async fn me(AuthUser(user_id): AuthUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// 인증 거부 사유.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let code = match self {
            AuthRejection::MissingToken => "MISSING_TOKEN",
            AuthRejection::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            AuthRejection::InvalidToken => "INVALID_TOKEN",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ApiErrorResponse::new(code, self.to_string())),
        )
            .into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthRejection::MissingToken)?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthRejection::InvalidAuthHeader)?;

        state
            .auth
            .authenticate(token)
            .map(AuthUser)
            .map_err(|_| AuthRejection::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<AuthUser, AuthRejection> {
        let state = Arc::new(create_test_state());
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn test_missing_header() {
        assert_eq!(extract(None).await.unwrap_err(), AuthRejection::MissingToken);
    }

    #[tokio::test]
    async fn test_non_bearer_header() {
        assert_eq!(
            extract(Some("Basic dXNlcjpwYXNz")).await.unwrap_err(),
            AuthRejection::InvalidAuthHeader
        );
        assert_eq!(
            extract(Some("Bearer ")).await.unwrap_err(),
            AuthRejection::InvalidAuthHeader
        );
    }

    #[tokio::test]
    async fn test_garbage_token() {
        assert_eq!(
            extract(Some("Bearer not.a.jwt")).await.unwrap_err(),
            AuthRejection::InvalidToken
        );
    }

    #[test]
    fn test_rejection_is_unauthorized() {
        let response = AuthRejection::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
