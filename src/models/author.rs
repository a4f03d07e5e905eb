//! Author domain models

use super::post::PostSummary;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Author profile, owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub deleted: bool,
}

impl Author {
    pub fn new(name: impl Into<String>, user_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            user_id,
            deleted: false,
        }
    }
}

/// Create or rename author request
#[derive(Debug, Deserialize, Validate)]
pub struct AuthorRequest {
    #[validate(length(min = 3, max = 100, message = "author name must be 3-100 characters"))]
    pub name: String,
}

/// Author with its active posts
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: i64,
    pub author_name: String,
    pub posts: Vec<PostSummary>,
}
