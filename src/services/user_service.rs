//! 用户服务：注册、查询、更新、软删除

use crate::{
    auth::{password::PasswordHasher, policy},
    db::Db,
    error::AppError,
    models::{
        author::Author,
        user::{Credential, RegisterUserRequest, UpdateUserRequest, UserResponse},
    },
    repository::{AuthorRepository, RoleRepository, UserRepository},
};
use std::collections::BTreeSet;
use validator::Validate;

pub struct UserService {
    db: Db,
    password_hasher: PasswordHasher,
}

impl UserService {
    pub fn new(db: Db, password_hasher: PasswordHasher) -> Self {
        Self { db, password_hasher }
    }

    /// 注册用户
    ///
    /// Requests not made by an administrator cannot grant `ADMIN` and fall
    /// back to `USER` when no role is left.
    pub async fn register(
        &self,
        mut req: RegisterUserRequest,
        admin_request: bool,
    ) -> Result<UserResponse, AppError> {
        req.validate()?;

        if !admin_request {
            req.roles.retain(|r| !r.trim().eq_ignore_ascii_case(policy::ADMIN));
            if req.roles.is_empty() {
                req.roles.push(policy::USER.to_string());
            }
        } else if req.roles.is_empty() {
            return Err(AppError::validation("at least one role is required"));
        }

        let author_name = if req.is_author {
            Some(required_author_name(req.author_name.as_deref())?)
        } else {
            None
        };

        let role_ids = self.resolve_role_names(&req.roles).await?;
        if author_name.is_some() {
            self.ensure_author_role(&role_ids).await?;
        }
        let password_hash = self.password_hasher.hash_blocking(req.password).await?;

        let user_repo = UserRepository::new(self.db.clone());
        let credential = user_repo
            .insert(Credential::new(req.username, password_hash, role_ids))
            .await?;

        if let Some(name) = author_name {
            let author_repo = AuthorRepository::new(self.db.clone());
            author_repo.insert(Author::new(name, credential.id)).await?;
        }

        tracing::info!(
            user_id = credential.id,
            username = %credential.username,
            admin_request,
            "User registered"
        );

        self.to_response(credential).await
    }

    /// 根据 ID 获取用户
    pub async fn get(&self, id: i64) -> Result<UserResponse, AppError> {
        let user_repo = UserRepository::new(self.db.clone());
        let credential = user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;

        self.to_response(credential).await
    }

    /// 列出所有用户
    pub async fn list(&self) -> Result<Vec<UserResponse>, AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        let mut users = Vec::new();
        for credential in user_repo.list().await? {
            users.push(self.to_response(credential).await?);
        }
        Ok(users)
    }

    /// 部分更新用户
    ///
    /// Every check runs before the first write, so a rejected update leaves
    /// the stored user untouched.
    pub async fn update(&self, id: i64, req: UpdateUserRequest) -> Result<UserResponse, AppError> {
        req.validate()?;

        let user_repo = UserRepository::new(self.db.clone());
        let author_repo = AuthorRepository::new(self.db.clone());

        let mut credential = user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;

        if let Some(roles) = req.roles.filter(|r| !r.is_empty()) {
            credential.role_ids = self.resolve_role_names(&roles).await?;
        }

        // 作者关联
        let existing_author = author_repo.find_by_user_id(id).await?;
        let author_change = match (req.is_author, existing_author) {
            (Some(false), Some(author)) => AuthorChange::Unlink(author.id),
            (Some(true), None) => {
                let name = required_author_name(req.author_name.as_deref())?;
                self.ensure_author_role(&credential.role_ids).await?;
                AuthorChange::Create(name)
            }
            (Some(true) | None, Some(mut author)) => {
                match req.author_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                    Some(name) => {
                        author.name = name.to_string();
                        AuthorChange::Rename(author)
                    }
                    None => AuthorChange::Keep,
                }
            }
            (Some(false) | None, None) => AuthorChange::Keep,
        };

        if let Some(username) = req.username {
            credential.username = username;
        }

        if let Some(password) = req.password {
            credential.password_hash = self.password_hasher.hash_blocking(password).await?;
        }

        let credential = user_repo.update(credential).await?;

        match author_change {
            AuthorChange::Unlink(author_id) => {
                author_repo.soft_delete(author_id).await?;
            }
            AuthorChange::Create(name) => {
                author_repo.insert(Author::new(name, id)).await?;
            }
            AuthorChange::Rename(author) => {
                author_repo.update(author).await?;
            }
            AuthorChange::Keep => {}
        }

        tracing::info!(user_id = id, "User updated");
        self.to_response(credential).await
    }

    /// 软删除用户
    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        if !user_repo.soft_delete(id).await? {
            return Err(AppError::NotFound(format!("user {}", id)));
        }

        tracing::info!(user_id = id, "User soft-deleted");
        Ok(())
    }

    /// Author profiles belong to holders of the AUTHOR role
    async fn ensure_author_role(&self, role_ids: &BTreeSet<i64>) -> Result<(), AppError> {
        let role_repo = RoleRepository::new(self.db.clone());
        let is_author = role_repo
            .find_many(role_ids)
            .await?
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(policy::AUTHOR));

        if !is_author {
            return Err(AppError::validation("authors must hold the AUTHOR role"));
        }
        Ok(())
    }

    async fn resolve_role_names(&self, names: &[String]) -> Result<BTreeSet<i64>, AppError> {
        let role_repo = RoleRepository::new(self.db.clone());

        let mut ids = BTreeSet::new();
        for name in names {
            let role = role_repo
                .find_by_name(name.trim())
                .await?
                .ok_or_else(|| AppError::NotFound(format!("role '{}'", name)))?;
            ids.insert(role.id);
        }
        Ok(ids)
    }

    async fn to_response(&self, credential: Credential) -> Result<UserResponse, AppError> {
        let role_repo = RoleRepository::new(self.db.clone());
        let author_repo = AuthorRepository::new(self.db.clone());

        let roles = role_repo
            .find_many(&credential.role_ids)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();
        let author_id = author_repo
            .find_by_user_id(credential.id)
            .await?
            .map(|a| a.id);

        Ok(UserResponse {
            id: credential.id,
            username: credential.username,
            roles,
            author_id,
        })
    }
}

/// Author-link change decided before the credential is written
enum AuthorChange {
    Keep,
    Unlink(i64),
    Create(String),
    Rename(Author),
}

fn required_author_name(name: Option<&str>) -> Result<String, AppError> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AppError::validation("author name is required for authors")),
    }
}
