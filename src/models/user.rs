//! User domain models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

/// Stored login identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub username: String,

    /// PHC-formatted hash, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,

    // Account state
    pub enabled: bool,
    pub account_not_locked: bool,
    pub account_not_expired: bool,
    pub credential_not_expired: bool,

    pub deleted: bool,
    pub role_ids: BTreeSet<i64>,
}

impl Credential {
    /// New active credential; the id is assigned on insert
    pub fn new(username: impl Into<String>, password_hash: String, role_ids: BTreeSet<i64>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            password_hash,
            display_name: None,
            enabled: true,
            account_not_locked: true,
            account_not_expired: true,
            credential_not_expired: true,
            deleted: false,
            role_ids,
        }
    }
}

/// Register user request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 3, max = 100, message = "author name must be 3-100 characters"))]
    pub author_name: Option<String>,

    #[serde(default)]
    pub is_author: bool,

    #[serde(default)]
    pub roles: Vec<String>,
}

/// Partial user update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: Option<String>,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,

    pub roles: Option<Vec<String>>,

    /// `Some(false)` unlinks the author record
    pub is_author: Option<bool>,

    #[validate(length(min = 3, max = 100, message = "author name must be 3-100 characters"))]
    pub author_name: Option<String>,
}

/// User response (without sensitive data)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub roles: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
}

/// Caller identity as seen by `/api/users/info`
#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub username: String,
    pub authorities: BTreeSet<String>,
}
