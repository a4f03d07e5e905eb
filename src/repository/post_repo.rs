//! Post repository

use crate::{db::Db, error::AppError, models::post::Post};

pub struct PostRepository {
    db: Db,
}

impl PostRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Post>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.posts.list_active())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.posts.find_active(id).cloned())
    }

    pub async fn find_by_id_including_deleted(&self, id: i64) -> Result<Option<Post>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.posts.find_any(id).cloned())
    }

    /// Active posts of an author, in id order
    pub async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>, AppError> {
        let tables = self.db.read().await;
        Ok(tables
            .posts
            .list_active()
            .into_iter()
            .filter(|p| p.author_id == author_id)
            .collect())
    }

    pub async fn insert(&self, post: Post) -> Result<Post, AppError> {
        let mut tables = self.db.write().await;
        Ok(tables.posts.insert(post))
    }

    pub async fn update(&self, post: Post) -> Result<Post, AppError> {
        let mut tables = self.db.write().await;

        if !tables.posts.replace(post.clone()) {
            return Err(AppError::NotFound(format!("post {}", post.id)));
        }

        Ok(post)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.db.write().await;
        Ok(tables.posts.soft_delete(id))
    }
}
