//! 角色与权限管理服务

use crate::{
    auth::jwt::is_encodable_authority,
    db::Db,
    error::AppError,
    models::role::{
        CreateRoleRequest, Permission, PermissionRequest, PermissionResponse, Role, RoleResponse,
        UpdateRoleRequest,
    },
    repository::{PermissionRepository, RoleRepository},
};
use std::collections::BTreeSet;
use validator::Validate;

pub struct RoleService {
    db: Db,
}

impl RoleService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    // ==================== Roles ====================

    /// 列出所有角色
    pub async fn list_roles(&self) -> Result<Vec<RoleResponse>, AppError> {
        let role_repo = RoleRepository::new(self.db.clone());

        let mut roles = Vec::new();
        for role in role_repo.list().await? {
            roles.push(self.role_response(role).await?);
        }
        Ok(roles)
    }

    pub async fn get_role(&self, id: i64) -> Result<RoleResponse, AppError> {
        let role_repo = RoleRepository::new(self.db.clone());
        let role = role_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {}", id)))?;

        self.role_response(role).await
    }

    /// 创建角色
    pub async fn create_role(&self, req: CreateRoleRequest) -> Result<RoleResponse, AppError> {
        req.validate()?;
        let name = role_name(&req.name)?;

        self.ensure_permissions_exist(&req.permission_ids).await?;

        let role_repo = RoleRepository::new(self.db.clone());
        let role = role_repo.insert(Role::new(name, req.permission_ids)).await?;

        tracing::info!(role_id = role.id, role = %role.name, "Role created");
        self.role_response(role).await
    }

    /// 更新角色
    pub async fn update_role(
        &self,
        id: i64,
        req: UpdateRoleRequest,
    ) -> Result<RoleResponse, AppError> {
        req.validate()?;

        let role_repo = RoleRepository::new(self.db.clone());
        let mut role = role_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {}", id)))?;

        if let Some(name) = req.name {
            role.name = role_name(&name)?;
        }

        if let Some(permission_ids) = req.permission_ids {
            self.ensure_permissions_exist(&permission_ids).await?;
            role.permission_ids = permission_ids;
        }

        let role = role_repo.update(role).await?;

        tracing::info!(role_id = role.id, "Role updated");
        self.role_response(role).await
    }

    /// 软删除角色
    pub async fn delete_role(&self, id: i64) -> Result<(), AppError> {
        let role_repo = RoleRepository::new(self.db.clone());

        if !role_repo.soft_delete(id).await? {
            return Err(AppError::NotFound(format!("role {}", id)));
        }

        tracing::info!(role_id = id, "Role soft-deleted");
        Ok(())
    }

    // ==================== Permissions ====================

    /// 列出所有权限
    pub async fn list_permissions(&self) -> Result<Vec<PermissionResponse>, AppError> {
        let permission_repo = PermissionRepository::new(self.db.clone());
        Ok(permission_repo
            .list()
            .await?
            .iter()
            .map(PermissionResponse::from)
            .collect())
    }

    pub async fn get_permission(&self, id: i64) -> Result<PermissionResponse, AppError> {
        let permission_repo = PermissionRepository::new(self.db.clone());
        let permission = permission_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission {}", id)))?;

        Ok(PermissionResponse::from(&permission))
    }

    /// 创建权限
    pub async fn create_permission(
        &self,
        req: PermissionRequest,
    ) -> Result<PermissionResponse, AppError> {
        req.validate()?;
        let name = authority_name(&req.name)?;

        let permission_repo = PermissionRepository::new(self.db.clone());
        let permission = permission_repo.insert(Permission::new(name)).await?;

        tracing::info!(permission_id = permission.id, permission = %permission.name, "Permission created");
        Ok(PermissionResponse::from(&permission))
    }

    /// 重命名权限
    pub async fn update_permission(
        &self,
        id: i64,
        req: PermissionRequest,
    ) -> Result<PermissionResponse, AppError> {
        req.validate()?;
        let name = authority_name(&req.name)?;

        let permission_repo = PermissionRepository::new(self.db.clone());
        let mut permission = permission_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission {}", id)))?;

        permission.name = name;
        let permission = permission_repo.update(permission).await?;

        Ok(PermissionResponse::from(&permission))
    }

    /// 软删除权限
    pub async fn delete_permission(&self, id: i64) -> Result<(), AppError> {
        let permission_repo = PermissionRepository::new(self.db.clone());

        if !permission_repo.soft_delete(id).await? {
            return Err(AppError::NotFound(format!("permission {}", id)));
        }

        tracing::info!(permission_id = id, "Permission soft-deleted");
        Ok(())
    }

    async fn ensure_permissions_exist(&self, ids: &BTreeSet<i64>) -> Result<(), AppError> {
        let permission_repo = PermissionRepository::new(self.db.clone());
        let found = permission_repo.find_many(ids).await?;

        if found.len() != ids.len() {
            let found_ids: BTreeSet<i64> = found.iter().map(|p| p.id).collect();
            let missing: Vec<String> = ids
                .difference(&found_ids)
                .map(|id| id.to_string())
                .collect();
            return Err(AppError::NotFound(format!(
                "permission(s) {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    async fn role_response(&self, role: Role) -> Result<RoleResponse, AppError> {
        let permission_repo = PermissionRepository::new(self.db.clone());
        let permissions = permission_repo
            .find_many(&role.permission_ids)
            .await?
            .iter()
            .map(PermissionResponse::from)
            .collect();

        Ok(RoleResponse {
            id: role.id,
            name: role.name,
            permissions,
        })
    }
}

/// Names are carried verbatim inside the token's `authorities` claim
fn authority_name(value: &str) -> Result<String, AppError> {
    if !is_encodable_authority(value) {
        return Err(AppError::validation(
            "name must be non-empty, without ',' or leading/trailing whitespace",
        ));
    }
    Ok(value.to_string())
}

/// Role names are stored upper-case; role checks compare `ROLE_<NAME>` exactly
fn role_name(value: &str) -> Result<String, AppError> {
    Ok(authority_name(value)?.to_ascii_uppercase())
}
