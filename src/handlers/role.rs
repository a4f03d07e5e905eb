//! 角色与权限管理的 HTTP 处理器（仅管理员）

use crate::{
    auth::{
        context::SecurityContext,
        policy::{self, Requirement},
    },
    error::AppError,
    middleware::AppState,
    models::role::{CreateRoleRequest, PermissionRequest, UpdateRoleRequest},
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

// ==================== Roles ====================

pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let roles = state.role_service.list_roles().await?;

    Ok(Json(roles))
}

pub async fn get_role(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let role = state.role_service.get_role(id).await?;

    Ok(Json(role))
}

pub async fn create_role(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Json(req): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let role = state.role_service.create_role(req).await?;

    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let role = state.role_service.update_role(id, req).await?;

    Ok(Json(role))
}

pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    state.role_service.delete_role(id).await?;

    Ok(Json(json!({ "message": format!("role {} deleted", id) })))
}

// ==================== Permissions ====================

pub async fn list_permissions(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let permissions = state.role_service.list_permissions().await?;

    Ok(Json(permissions))
}

pub async fn get_permission(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let permission = state.role_service.get_permission(id).await?;

    Ok(Json(permission))
}

pub async fn create_permission(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Json(req): Json<PermissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let permission = state.role_service.create_permission(req).await?;

    Ok((StatusCode::CREATED, Json(permission)))
}

pub async fn update_permission(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
    Json(req): Json<PermissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let permission = state.role_service.update_permission(id, req).await?;

    Ok(Json(permission))
}

pub async fn delete_permission(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    state.role_service.delete_permission(id).await?;

    Ok(Json(json!({ "message": format!("permission {} deleted", id) })))
}
