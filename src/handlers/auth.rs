//! 认证相关的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::auth::{LoginRequest, LoginResponse},
};
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.auth_service.login(&req.username, &req.password).await?;

    let username = outcome
        .context
        .principal()
        .map(|p| p.username.clone())
        .unwrap_or(req.username);

    Ok(Json(LoginResponse::ok(username, outcome.token)))
}
