//! API 에러 응답 타입.
//!
//! 인증 서비스 에러를 HTTP 상태 코드와 JSON 본문으로 변환합니다.
//!
//! ```json
//! {
//!   "code": "EMAIL_ALREADY_EXISTS",
//!   "message": "이미 등록된 이메일입니다",
//!   "timestamp": 1738300800
//! }
//! ```
//!
//! 입력 검증 에러는 `details.field`에 문제가 된 필드 이름을 담습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use todo_core::AuthError;
use tracing::{debug, error};

/// API 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_EMAIL", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 인증 에러의 HTTP 상태 코드.
pub fn status_code(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidEmail
        | AuthError::WeakPassword
        | AuthError::InvalidUsername
        | AuthError::EmailAlreadyExists => StatusCode::BAD_REQUEST,
        AuthError::AuthenticationFailed
        | AuthError::InvalidRefreshToken
        | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthError::NotFound => StatusCode::NOT_FOUND,
        AuthError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        AuthError::Config(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 검증 에러가 가리키는 요청 필드.
fn invalid_field(err: &AuthError) -> Option<&'static str> {
    match err {
        AuthError::InvalidEmail => Some("email"),
        AuthError::WeakPassword => Some("password"),
        AuthError::InvalidUsername => Some("username"),
        _ => None,
    }
}

/// 핸들러 에러 래퍼.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_code(&self.0);

        // 내부 에러 상세는 로그에만 남김
        let message = if status.is_server_error() {
            error!(code = self.0.code(), error = %self.0, "request failed");
            match self.0 {
                AuthError::DeadlineExceeded => self.0.to_string(),
                _ => "내부 서버 오류".to_string(),
            }
        } else {
            self.0.to_string()
        };

        let mut body = ApiErrorResponse::new(self.0.code(), message);
        if self.0.is_validation() {
            debug!(code = self.0.code(), "request rejected by validation");
            if let Some(field) = invalid_field(&self.0) {
                body = body.with_details(json!({ "field": field }));
            }
        }

        (status, Json(body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_code(&AuthError::InvalidEmail), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_code(&AuthError::EmailAlreadyExists),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code(&AuthError::AuthenticationFailed),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_code(&AuthError::InvalidRefreshToken),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_code(&AuthError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_code(&AuthError::DeadlineExceeded),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_code(&AuthError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_body_hides_detail() {
        let response = ApiError(AuthError::Internal("db password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ApiErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed.code, "INTERNAL_ERROR");
        assert!(!parsed.message.contains("hunter2"));
        assert!(parsed.timestamp.is_some());
    }

    #[tokio::test]
    async fn test_validation_error_names_field() {
        let response = ApiError(AuthError::WeakPassword).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ApiErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed.code, "WEAK_PASSWORD");
        assert_eq!(parsed.details, Some(json!({ "field": "password" })));
    }

    #[tokio::test]
    async fn test_non_validation_error_has_no_details() {
        let response = ApiError(AuthError::EmailAlreadyExists).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ApiErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed.code, "EMAIL_ALREADY_EXISTS");
        assert!(parsed.details.is_none());
    }

    #[test]
    fn test_display() {
        let err = ApiErrorResponse::new("NOT_FOUND", "missing");
        assert_eq!(err.to_string(), "[NOT_FOUND] missing");
    }
}
