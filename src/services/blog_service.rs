//! Authors and posts
//!
//! Responses are assembled from ids: a post's author name and an author's
//! posts are looked up, never followed through references.

use crate::{
    auth::{
        context::Principal,
        policy::{self, require_owner_or_role},
    },
    db::Db,
    error::AppError,
    models::{
        author::{Author, AuthorRequest, AuthorResponse},
        post::{CreatePostRequest, Post, PostResponse, PostSummary, UpdatePostRequest},
    },
    repository::{AuthorRepository, PostRepository, RoleRepository, UserRepository},
};
use validator::Validate;

pub struct BlogService {
    db: Db,
}

impl BlogService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    // ==================== Authors ====================

    pub async fn list_authors(&self) -> Result<Vec<AuthorResponse>, AppError> {
        let author_repo = AuthorRepository::new(self.db.clone());

        let mut authors = Vec::new();
        for author in author_repo.list().await? {
            authors.push(self.author_response(author).await?);
        }
        Ok(authors)
    }

    pub async fn get_author(&self, id: i64) -> Result<AuthorResponse, AppError> {
        let author = self.active_author(id).await?;
        self.author_response(author).await
    }

    /// Create the author profile of a user holding the AUTHOR role
    pub async fn create_author(
        &self,
        user_id: i64,
        req: AuthorRequest,
    ) -> Result<AuthorResponse, AppError> {
        req.validate()?;

        let user_repo = UserRepository::new(self.db.clone());
        let role_repo = RoleRepository::new(self.db.clone());

        let user = user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

        let is_author = role_repo
            .find_many(&user.role_ids)
            .await?
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(policy::AUTHOR));
        if !is_author {
            return Err(AppError::validation("user does not hold the AUTHOR role"));
        }

        let author_repo = AuthorRepository::new(self.db.clone());
        let author = author_repo
            .insert(Author::new(req.name.trim(), user_id))
            .await?;

        tracing::info!(author_id = author.id, user_id, "Author created");
        self.author_response(author).await
    }

    pub async fn update_author(
        &self,
        id: i64,
        req: AuthorRequest,
    ) -> Result<AuthorResponse, AppError> {
        req.validate()?;

        let mut author = self.active_author(id).await?;
        author.name = req.name.trim().to_string();

        let author_repo = AuthorRepository::new(self.db.clone());
        let author = author_repo.update(author).await?;

        self.author_response(author).await
    }

    pub async fn delete_author(&self, id: i64) -> Result<(), AppError> {
        let author_repo = AuthorRepository::new(self.db.clone());

        if !author_repo.soft_delete(id).await? {
            return Err(AppError::NotFound(format!("author {}", id)));
        }

        tracing::info!(author_id = id, "Author soft-deleted");
        Ok(())
    }

    // ==================== Posts ====================

    pub async fn list_posts(&self) -> Result<Vec<PostResponse>, AppError> {
        let post_repo = PostRepository::new(self.db.clone());

        let mut posts = Vec::new();
        for post in post_repo.list().await? {
            posts.push(self.post_response(post).await?);
        }
        Ok(posts)
    }

    pub async fn get_post(&self, id: i64) -> Result<PostResponse, AppError> {
        let post = self.active_post(id).await?;
        self.post_response(post).await
    }

    /// 创建文章；非管理员只能以自己的作者身份发布
    pub async fn create_post(
        &self,
        principal: &Principal,
        req: CreatePostRequest,
    ) -> Result<PostResponse, AppError> {
        req.validate()?;

        let author = self.active_author(req.author_id).await?;
        let owner = self.owner_username(&author).await?;
        require_owner_or_role(principal, &owner, policy::ADMIN)?;

        let post_repo = PostRepository::new(self.db.clone());
        let post = post_repo
            .insert(Post::new(req.title, req.content, author.id))
            .await?;

        tracing::info!(post_id = post.id, author_id = author.id, "Post created");
        self.post_response(post).await
    }

    /// 更新文章；作者本人或管理员
    pub async fn update_post(
        &self,
        principal: &Principal,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostResponse, AppError> {
        req.validate()?;

        let mut post = self.active_post(id).await?;
        let owner = self.post_owner_username(&post).await?;
        require_owner_or_role(principal, &owner, policy::ADMIN)?;

        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(content) = req.content {
            post.content = content;
        }

        let post_repo = PostRepository::new(self.db.clone());
        let post = post_repo.update(post).await?;

        tracing::info!(post_id = post.id, updated_by = %principal.username, "Post updated");
        self.post_response(post).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), AppError> {
        let post_repo = PostRepository::new(self.db.clone());

        if !post_repo.soft_delete(id).await? {
            return Err(AppError::NotFound(format!("post {}", id)));
        }

        tracing::info!(post_id = id, "Post soft-deleted");
        Ok(())
    }

    // ==================== Helpers ====================

    async fn active_author(&self, id: i64) -> Result<Author, AppError> {
        AuthorRepository::new(self.db.clone())
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("author {}", id)))
    }

    async fn active_post(&self, id: i64) -> Result<Post, AppError> {
        PostRepository::new(self.db.clone())
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", id)))
    }

    /// Username of the user owning the author, deleted users included
    async fn owner_username(&self, author: &Author) -> Result<String, AppError> {
        let user_repo = UserRepository::new(self.db.clone());
        user_repo
            .find_by_id_including_deleted(author.user_id)
            .await?
            .map(|u| u.username)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "author {} references unknown user {}",
                    author.id, author.user_id
                ))
            })
    }

    async fn post_owner_username(&self, post: &Post) -> Result<String, AppError> {
        let author_repo = AuthorRepository::new(self.db.clone());
        let author = author_repo
            .find_by_id_including_deleted(post.author_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "post {} references unknown author {}",
                    post.id, post.author_id
                ))
            })?;
        self.owner_username(&author).await
    }

    async fn author_response(&self, author: Author) -> Result<AuthorResponse, AppError> {
        let post_repo = PostRepository::new(self.db.clone());
        let posts = post_repo
            .list_by_author(author.id)
            .await?
            .iter()
            .map(PostSummary::from)
            .collect();

        Ok(AuthorResponse {
            id: author.id,
            author_name: author.name,
            posts,
        })
    }

    async fn post_response(&self, post: Post) -> Result<PostResponse, AppError> {
        let author_repo = AuthorRepository::new(self.db.clone());
        let author_name = author_repo
            .find_by_id_including_deleted(post.author_id)
            .await?
            .map(|a| a.name)
            .unwrap_or_default();

        Ok(PostResponse {
            id: post.id,
            title: post.title,
            content: post.content,
            author_name,
        })
    }
}
