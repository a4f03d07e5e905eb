//! User repository (凭证数据访问层)

use crate::{
    db::Db,
    error::AppError,
    models::{role::Permission, role::Role, user::Credential},
};

/// Credential with every role and permission it references, read in one snapshot.
///
/// Soft-deleted roles and permissions are included; callers decide what to drop.
#[derive(Debug, Clone)]
pub struct AccountGrants {
    pub credential: Credential,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

pub struct UserRepository {
    db: Db,
}

impl UserRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// 根据用户名查找未删除的用户
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AppError> {
        let tables = self.db.read().await;
        Ok(tables
            .credentials
            .find_active_by(|c| c.username == username)
            .cloned())
    }

    /// 根据 ID 查找未删除的用户
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.credentials.find_active(id).cloned())
    }

    /// 根据 ID 查找用户（包括已删除）
    pub async fn find_by_id_including_deleted(
        &self,
        id: i64,
    ) -> Result<Option<Credential>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.credentials.find_any(id).cloned())
    }

    /// 列出未删除的用户
    pub async fn list(&self) -> Result<Vec<Credential>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.credentials.list_active())
    }

    /// Active credential plus its grants
    pub async fn find_grants(&self, username: &str) -> Result<Option<AccountGrants>, AppError> {
        let tables = self.db.read().await;

        let Some(credential) = tables
            .credentials
            .find_active_by(|c| c.username == username)
            .cloned()
        else {
            return Ok(None);
        };

        let roles: Vec<Role> = credential
            .role_ids
            .iter()
            .filter_map(|id| tables.roles.find_any(*id).cloned())
            .collect();

        let mut permission_ids: Vec<i64> = roles
            .iter()
            .flat_map(|role| role.permission_ids.iter().copied())
            .collect();
        permission_ids.sort_unstable();
        permission_ids.dedup();

        let permissions = permission_ids
            .into_iter()
            .filter_map(|id| tables.permissions.find_any(id).cloned())
            .collect();

        Ok(Some(AccountGrants {
            credential,
            roles,
            permissions,
        }))
    }

    /// 创建用户；用户名在所有行（包括已删除）中唯一
    pub async fn insert(&self, credential: Credential) -> Result<Credential, AppError> {
        let mut tables = self.db.write().await;

        if tables
            .credentials
            .find_any_by(|c| c.username == credential.username)
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                credential.username
            )));
        }

        Ok(tables.credentials.insert(credential))
    }

    /// Insert the credential unless the username exists; returns the stored row
    /// and whether it was created
    pub async fn insert_if_absent(
        &self,
        credential: Credential,
    ) -> Result<(Credential, bool), AppError> {
        let mut tables = self.db.write().await;

        if let Some(existing) = tables
            .credentials
            .find_any_by(|c| c.username == credential.username)
        {
            return Ok((existing.clone(), false));
        }

        Ok((tables.credentials.insert(credential), true))
    }

    /// 更新用户
    pub async fn update(&self, credential: Credential) -> Result<Credential, AppError> {
        let mut tables = self.db.write().await;

        if tables
            .credentials
            .find_any_by(|c| c.username == credential.username && c.id != credential.id)
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                credential.username
            )));
        }

        if !tables.credentials.replace(credential.clone()) {
            return Err(AppError::NotFound(format!("user {}", credential.id)));
        }

        Ok(credential)
    }

    /// 软删除用户
    pub async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.db.write().await;
        Ok(tables.credentials.soft_delete(id))
    }
}
