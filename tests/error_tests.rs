//! 错误处理测试
//!
//! 测试应用错误类型的状态码、对外消息与响应体格式

use axum::{http::StatusCode, response::IntoResponse};
use blog_service::error::AppError;
use http_body_util::BodyExt;

// ==================== 错误状态码测试 ====================

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        AppError::InvalidToken("expired".to_string()).status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::AccountDisabled.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::AccountLocked.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::AccountExpired.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::CredentialsExpired.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound("post 1".to_string()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Validation("bad".to_string()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Conflict("dup".to_string()).status_code(), StatusCode::CONFLICT);
    assert_eq!(
        AppError::Config("bad".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Internal("boom".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// ==================== 对外消息测试 ====================

#[test]
fn test_internal_details_hidden() {
    assert_eq!(
        AppError::Internal("lock poisoned at db.rs:42".to_string()).user_message(),
        "Internal server error"
    );
    assert_eq!(
        AppError::Config("jwt secret = hunter2".to_string()).user_message(),
        "Configuration error"
    );
    assert_eq!(
        AppError::InvalidToken("InvalidSignature".to_string()).user_message(),
        "Invalid token. Not authorized"
    );
}

#[test]
fn test_validation_errors_convert() {
    use validator::Validate;

    let req = blog_service::models::author::AuthorRequest { name: "x".to_string() };
    let error: AppError = req.validate().unwrap_err().into();

    assert!(matches!(error, AppError::Validation(_)));
}

// ==================== 响应体测试 ====================

#[tokio::test]
async fn test_error_response_body() {
    let response = AppError::Forbidden.into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["error"]["code"], 403);
    assert_eq!(json["error"]["message"], "Access denied");
    assert!(json["error"]["request_id"].is_string());
}

#[tokio::test]
async fn test_invalid_credentials_body() {
    let response = AppError::InvalidCredentials.into_response();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["error"]["code"], 401);
    assert_eq!(json["error"]["message"], "Invalid username or password");
}
