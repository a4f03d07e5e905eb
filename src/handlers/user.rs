//! 用户管理的 HTTP 处理器

use crate::{
    auth::{
        context::SecurityContext,
        policy::{self, Requirement},
    },
    error::AppError,
    middleware::AppState,
    models::user::{RegisterUserRequest, UpdateUserRequest, UserInfoResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

const ADMIN_ONLY: Requirement = Requirement::AnyRole(&[policy::ADMIN]);

/// 当前登录用户信息
pub async fn user_info(ctx: SecurityContext) -> Result<impl IntoResponse, AppError> {
    let principal = Requirement::Authenticated.check(&ctx)?;

    Ok(Json(UserInfoResponse {
        username: principal.username.clone(),
        authorities: principal.authorities.clone(),
    }))
}

/// 管理员访问确认
pub async fn admin_status(ctx: SecurityContext) -> Result<impl IntoResponse, AppError> {
    let principal = ADMIN_ONLY.check(&ctx)?;

    Ok(Json(json!({
        "message": "Access granted: authenticated as ADMIN",
        "username": principal.username,
        "roles": principal.roles(),
    })))
}

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let users = state.user_service.list().await?;

    Ok(Json(json!({
        "count": users.len(),
        "users": users,
    })))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let user = state.user_service.get(id).await?;

    Ok(Json(user))
}

/// 管理员创建用户，可分配任意角色
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let user = state.user_service.register(req, true).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// 公开注册
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin_request = ctx.principal().is_some_and(|p| p.has_role(policy::ADMIN));

    let user = state.user_service.register(req, admin_request).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// 更新用户
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let user = state.user_service.update(id, req).await?;

    Ok(Json(user))
}

/// 软删除用户
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    state.user_service.soft_delete(id).await?;

    Ok(Json(json!({ "message": format!("user {} deleted", id) })))
}
