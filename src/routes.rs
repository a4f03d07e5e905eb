//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{auth::middleware::request_gate, handlers, middleware::AppState};

/// 请求体上限
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
///
/// 所有路由都经过请求网关；访问控制由各处理器声明的要求决定。
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/auth/login", post(handlers::auth::login))
        .route("/api/users/register", post(handlers::user::register_user));

    // 用户
    let user_routes = Router::new()
        .route("/api/users/info", get(handlers::user::user_info))
        .route("/api/users/status", get(handlers::user::admin_status))
        .route(
            "/api/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::user::get_user)
                .patch(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        );

    // 作者与文章
    let blog_routes = Router::new()
        .route("/api/authors", get(handlers::author::list_authors))
        .route("/api/authors/status", get(handlers::author::author_status))
        .route(
            "/api/authors/{id}",
            get(handlers::author::get_author)
                .post(handlers::author::create_author)
                .patch(handlers::author::update_author)
                .delete(handlers::author::delete_author),
        )
        .route(
            "/api/posts",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route("/api/posts/status", get(handlers::post::post_status))
        .route(
            "/api/posts/{id}",
            get(handlers::post::get_post)
                .patch(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        );

    // 角色与权限
    let admin_routes = Router::new()
        .route(
            "/api/roles",
            get(handlers::role::list_roles).post(handlers::role::create_role),
        )
        .route(
            "/api/roles/{id}",
            get(handlers::role::get_role)
                .patch(handlers::role::update_role)
                .delete(handlers::role::delete_role),
        )
        .route(
            "/api/permissions",
            get(handlers::role::list_permissions).post(handlers::role::create_permission),
        )
        .route(
            "/api/permissions/{id}",
            get(handlers::role::get_permission)
                .patch(handlers::role::update_permission)
                .delete(handlers::role::delete_permission),
        );

    // 组合所有路由；网关在追踪之内执行
    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(blog_routes)
        .merge(admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.request_gate(),
            request_gate,
        ))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
