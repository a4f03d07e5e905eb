//! 作者管理的 HTTP 处理器

use crate::{
    auth::{
        context::SecurityContext,
        policy::{self, Requirement},
    },
    error::AppError,
    middleware::AppState,
    models::author::AuthorRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

const READERS: Requirement = Requirement::AnyRole(&[policy::ADMIN, policy::USER, policy::AUTHOR]);
const ADMIN_ONLY: Requirement = Requirement::AnyRole(&[policy::ADMIN]);

pub async fn list_authors(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
) -> Result<impl IntoResponse, AppError> {
    READERS.check(&ctx)?;

    let authors = state.blog_service.list_authors().await?;

    Ok(Json(authors))
}

pub async fn get_author(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    READERS.check(&ctx)?;

    let author = state.blog_service.get_author(id).await?;

    Ok(Json(author))
}

/// 访问确认，返回调用者的角色
pub async fn author_status(ctx: SecurityContext) -> Result<impl IntoResponse, AppError> {
    let principal = READERS.check(&ctx)?;

    Ok(Json(json!({
        "message": "Access granted to authors",
        "username": principal.username,
        "roles": principal.roles(),
    })))
}

/// 为持有 AUTHOR 角色的用户创建作者资料
pub async fn create_author(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(user_id): Path<i64>,
    Json(req): Json<AuthorRequest>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let author = state.blog_service.create_author(user_id, req).await?;

    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn update_author(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
    Json(req): Json<AuthorRequest>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    let author = state.blog_service.update_author(id, req).await?;

    Ok(Json(author))
}

pub async fn delete_author(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    state.blog_service.delete_author(id).await?;

    Ok(Json(json!({ "message": format!("author {} deleted", id) })))
}
