//! 健康检查处理器

use crate::{db, middleware::AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// 设置应用启动时间
pub fn set_start_time() {
    let _ = APP_START_TIME.set(Instant::now());
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME
        .get()
        .map_or(0, |start| start.elapsed().as_secs())
}

/// 健康检查，包含存储状态
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (code, status, message) = match db::health_check(&state.db).await {
        db::HealthStatus::Healthy => (StatusCode::OK, "ok", None),
        db::HealthStatus::Unhealthy(msg) => (StatusCode::SERVICE_UNAVAILABLE, "degraded", Some(msg)),
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: get_uptime(),
            message,
        }),
    )
}
