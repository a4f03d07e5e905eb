//! Post domain models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub deleted: bool,
}

impl Post {
    pub fn new(title: impl Into<String>, content: impl Into<String>, author_id: i64) -> Self {
        Self {
            id: 0,
            title: title.into(),
            content: content.into(),
            author_id,
            deleted: false,
        }
    }
}

/// 创建文章请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub content: String,

    pub author_id: i64,
}

/// 更新文章请求
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: Option<String>,

    pub content: Option<String>,
}

/// Post as listed under its author
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
        }
    }
}

/// Post with the author's name resolved
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_length_limit() {
        let req = CreatePostRequest {
            title: "x".repeat(256),
            content: String::new(),
            author_id: 1,
        };
        assert!(req.validate().is_err());

        let req = CreatePostRequest {
            title: "x".repeat(255),
            content: String::new(),
            author_id: 1,
        };
        assert!(req.validate().is_ok());
    }
}
