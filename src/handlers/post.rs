//! 文章的 HTTP 处理器

use crate::{
    auth::{
        context::SecurityContext,
        policy::{self, Requirement},
    },
    error::AppError,
    middleware::AppState,
    models::post::{CreatePostRequest, UpdatePostRequest},
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
const WRITERS: Requirement = Requirement::AnyRole(&[policy::ADMIN, policy::AUTHOR]);
const ADMIN_ONLY: Requirement = Requirement::AnyRole(&[policy::ADMIN]);

pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
) -> Result<impl IntoResponse, AppError> {
    READERS.check(&ctx)?;

    let posts = state.blog_service.list_posts().await?;

    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    READERS.check(&ctx)?;

    let post = state.blog_service.get_post(id).await?;

    Ok(Json(post))
}

pub async fn post_status(ctx: SecurityContext) -> Result<impl IntoResponse, AppError> {
    let principal = READERS.check(&ctx)?;

    Ok(Json(json!({
        "message": "Access granted to posts",
        "username": principal.username,
        "roles": principal.roles(),
    })))
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let principal = WRITERS.check(&ctx)?;

    let post = state.blog_service.create_post(principal, req).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// 更新文章：作者本人或管理员
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let principal = WRITERS.check(&ctx)?;

    let post = state.blog_service.update_post(principal, id, req).await?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    ctx: SecurityContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ADMIN_ONLY.check(&ctx)?;

    state.blog_service.delete_post(id).await?;

    Ok(Json(json!({ "message": format!("post {} deleted", id) })))
}
