//! 사용자 인증 endpoint.
//!
//! - `POST /sign-up` - 회원가입
//! - `POST /sign-in` - 로그인 (토큰 쌍 발급)
//! - `POST /auth/refresh` - 토큰 갱신
//! - `GET /me` - 인증된 사용자 정보

use axum::{extract::State, routing::{get, post}, Json, Router};
use std::sync::Arc;
use todo_core::{TokenPair, UserProfile};

use crate::auth::{AuthUser, RefreshRequest, SignInRequest, SignUpRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// 회원가입.
///
/// POST /api/v1/users/sign-up
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<Json<UserProfile>> {
    let ctx = state.request_context();
    let profile = state.auth.sign_up(&ctx, request).await?;
    Ok(Json(profile))
}

/// 로그인.
///
/// POST /api/v1/users/sign-in
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<TokenPair>> {
    let ctx = state.request_context();
    let pair = state.auth.sign_in(&ctx, request).await?;
    Ok(Json(pair))
}

/// 토큰 갱신.
///
/// POST /api/v1/users/auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let ctx = state.request_context();
    let pair = state
        .auth
        .refresh_tokens(&ctx, &request.refresh_token)
        .await?;
    Ok(Json(pair))
}

/// 현재 사용자 정보.
///
/// GET /api/v1/users/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let ctx = state.request_context();
    let profile = state.auth.profile(&ctx, user_id).await?;
    Ok(Json(profile))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/auth/refresh", post(refresh))
        .route("/me", get(me))
}
