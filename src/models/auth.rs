//! Authentication-related models

use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub message: String,
    pub jwt: String,
    pub status: bool,
}

impl LoginResponse {
    pub fn ok(username: impl Into<String>, jwt: String) -> Self {
        Self {
            username: username.into(),
            message: "Login OK".to_string(),
            jwt,
            status: true,
        }
    }
}
