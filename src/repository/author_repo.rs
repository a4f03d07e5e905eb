//! Author repository

use crate::{db::Db, error::AppError, models::author::Author};

pub struct AuthorRepository {
    db: Db,
}

impl AuthorRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Author>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.authors.list_active())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Author>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.authors.find_active(id).cloned())
    }

    pub async fn find_by_id_including_deleted(&self, id: i64) -> Result<Option<Author>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.authors.find_any(id).cloned())
    }

    /// Active author owned by the user
    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Author>, AppError> {
        let tables = self.db.read().await;
        Ok(tables
            .authors
            .find_active_by(|a| a.user_id == user_id)
            .cloned())
    }

    /// 创建作者；每个用户最多一个有效作者
    pub async fn insert(&self, author: Author) -> Result<Author, AppError> {
        let mut tables = self.db.write().await;

        if tables
            .authors
            .find_active_by(|a| a.user_id == author.user_id)
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "user {} already has an author profile",
                author.user_id
            )));
        }

        Ok(tables.authors.insert(author))
    }

    pub async fn update(&self, author: Author) -> Result<Author, AppError> {
        let mut tables = self.db.write().await;

        if !tables.authors.replace(author.clone()) {
            return Err(AppError::NotFound(format!("author {}", author.id)));
        }

        Ok(author)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.db.write().await;
        Ok(tables.authors.soft_delete(id))
    }
}
