//! Role and permission domain models

use crate::auth::jwt::is_encodable_authority;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use validator::{Validate, ValidationError};

/// Role, granted to users and carrying a set of permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub permission_ids: BTreeSet<i64>,
    pub deleted: bool,
}

impl Role {
    pub fn new(name: impl Into<String>, permission_ids: BTreeSet<i64>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            permission_ids,
            deleted: false,
        }
    }
}

/// Permission, a named capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub deleted: bool,
}

impl Permission {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            deleted: false,
        }
    }
}

/// Role and permission names end up in the comma-joined `authorities` claim
pub fn validate_authority_name(name: &str) -> Result<(), ValidationError> {
    if is_encodable_authority(name) {
        return Ok(());
    }
    Err(ValidationError::new("authority_name").with_message(Cow::Borrowed(
        "name must not contain ',' or leading/trailing whitespace",
    )))
}

/// Create role request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 50, message = "role name is required"))]
    #[validate(custom(function = "validate_authority_name"))]
    pub name: String,

    #[validate(length(min = 1, message = "at least one permission is required"))]
    #[serde(default)]
    pub permission_ids: BTreeSet<i64>,
}

/// Update role request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 50, message = "role name must not be empty"))]
    #[validate(custom(function = "validate_authority_name"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "at least one permission is required"))]
    pub permission_ids: Option<BTreeSet<i64>>,
}

/// Create or rename permission request
#[derive(Debug, Deserialize, Validate)]
pub struct PermissionRequest {
    #[validate(length(min = 1, max = 50, message = "permission name is required"))]
    #[validate(custom(function = "validate_authority_name"))]
    pub name: String,
}

/// Permission summary
#[derive(Debug, Clone, Serialize)]
pub struct PermissionResponse {
    pub id: i64,
    pub name: String,
}

impl From<&Permission> for PermissionResponse {
    fn from(permission: &Permission) -> Self {
        Self {
            id: permission.id,
            name: permission.name.clone(),
        }
    }
}

/// Role with its active permissions
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub permissions: Vec<PermissionResponse>,
}
