//! HTTP 中间件与应用状态
//! 请求追踪：trace_id/request_id、日志与指标

use crate::{
    auth::{jwt::JwtService, middleware::PublicPaths, password::PasswordHasher, RequestGate},
    config::AppConfig,
    db::Db,
    error::AppError,
    services::{AuthService, BlogService, RoleService, UserService},
};
use axum::{extract::Request, http::HeaderMap, http::HeaderValue, middleware::Next, response::Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 服务使用 Arc 包装，多个请求共享同一实例，Clone 只是指针拷贝。
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Db,
    pub jwt_service: Arc<JwtService>,
    pub password_hasher: PasswordHasher,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub role_service: Arc<RoleService>,
    pub blog_service: Arc<BlogService>,
}

impl AppState {
    /// 由配置和存储句柄构建全部服务
    pub fn new(config: AppConfig, db: Db) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let password_hasher = PasswordHasher::from_config(&config.security)?;

        Ok(Self {
            auth_service: Arc::new(AuthService::new(
                db.clone(),
                jwt_service.clone(),
                password_hasher.clone(),
                config.clone(),
            )?),
            user_service: Arc::new(UserService::new(db.clone(), password_hasher.clone())),
            role_service: Arc::new(RoleService::new(db.clone())),
            blog_service: Arc::new(BlogService::new(db.clone())),
            config,
            db,
            jwt_service,
            password_hasher,
        })
    }

    /// 请求网关所需的状态
    pub fn request_gate(&self) -> RequestGate {
        RequestGate::new(
            self.jwt_service.clone(),
            PublicPaths::new(self.config.security.public_paths.iter().cloned()),
        )
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method_label(&method),
            "status" => status_label(status)
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中回写追踪 id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        _ => "OTHER",
    }
}

fn status_label(status: u16) -> &'static str {
    match status {
        200 => "200",
        201 => "201",
        204 => "204",
        400 => "400",
        401 => "401",
        403 => "403",
        404 => "404",
        409 => "409",
        500 => "500",
        _ => "other",
    }
}
