//! 测试公共模块
//! 提供测试配置、带种子数据的应用以及 HTTP 辅助函数

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use blog_service::{
    config::{
        default_public_paths, AppConfig, BootstrapConfig, LoggingConfig, SecurityConfig,
        ServerConfig,
    },
    db::Db,
    middleware::AppState,
    models::{post::Post, user::RegisterUserRequest},
    repository::PostRepository,
    routes,
    services::bootstrap,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";
pub const ADMIN_PASSWORD: &str = "admin-pass";
pub const ALICE_PASSWORD: &str = "alice-pass";
pub const BOB_PASSWORD: &str = "bob-pass";
pub const CAROL_PASSWORD: &str = "carol-pass";

/// 创建测试配置（轻量 Argon2 参数）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_SECRET.to_string()),
            jwt_issuer: "blog-test".to_string(),
            token_ttl_secs: 1800,
            public_paths: default_public_paths(),
            default_role: "USER".to_string(),
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
        },
        bootstrap: BootstrapConfig {
            admin_username: "admin".to_string(),
            admin_password: Some(Secret::new(ADMIN_PASSWORD.to_string())),
        },
    }
}

/// 带种子数据的测试应用
pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub alice_id: i64,
    pub bob_id: i64,
    pub carol_id: i64,
    pub alice_author_id: i64,
    pub bob_author_id: i64,
    pub alice_post_id: i64,
    pub bob_post_id: i64,
}

/// 仅包含默认角色、权限与管理员的状态
pub async fn create_test_app_state() -> Arc<AppState> {
    let config = create_test_config();
    let db = Db::new();
    let state = AppState::new(config.clone(), db.clone()).expect("Failed to build state");

    bootstrap::seed_defaults(&db, &state.password_hasher, &config)
        .await
        .expect("Failed to seed defaults");

    Arc::new(state)
}

fn register_request(username: &str, password: &str, roles: &[&str], author: Option<&str>) -> RegisterUserRequest {
    RegisterUserRequest {
        username: username.to_string(),
        password: password.to_string(),
        author_name: author.map(str::to_string),
        is_author: author.is_some(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// alice、bob 为作者（各有一篇文章），carol 为普通用户
pub async fn setup_test_app() -> TestApp {
    let state = create_test_app_state().await;

    let alice = state
        .user_service
        .register(register_request("alice", ALICE_PASSWORD, &["AUTHOR"], Some("Alice Writer")), true)
        .await
        .expect("Failed to create alice");
    let bob = state
        .user_service
        .register(register_request("bob", BOB_PASSWORD, &["AUTHOR"], Some("Bob Writer")), true)
        .await
        .expect("Failed to create bob");
    let carol = state
        .user_service
        .register(register_request("carol", CAROL_PASSWORD, &["USER"], None), true)
        .await
        .expect("Failed to create carol");

    let alice_author_id = alice.author_id.expect("alice has an author profile");
    let bob_author_id = bob.author_id.expect("bob has an author profile");

    let post_repo = PostRepository::new(state.db.clone());
    let alice_post = post_repo
        .insert(Post::new("Alice's post", "Hello from Alice", alice_author_id))
        .await
        .unwrap();
    let bob_post = post_repo
        .insert(Post::new("Bob's post", "Hello from Bob", bob_author_id))
        .await
        .unwrap();

    TestApp {
        router: routes::create_router(state.clone()),
        state,
        alice_id: alice.id,
        bob_id: bob.id,
        carol_id: carol.id,
        alice_author_id,
        bob_author_id,
        alice_post_id: alice_post.id,
        bob_post_id: bob_post.id,
    }
}

/// 发送请求并解析 JSON 响应
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

/// 登录并返回 JWT
pub async fn login(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/auth/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", username, body);
    body["jwt"].as_str().expect("jwt in login response").to_string()
}
