//! Permission repository (权限数据访问)

use crate::{db::Db, error::AppError, models::role::Permission};
use std::collections::BTreeSet;

pub struct PermissionRepository {
    db: Db,
}

impl PermissionRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// 列出所有未删除的权限
    pub async fn list(&self) -> Result<Vec<Permission>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.permissions.list_active())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Permission>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.permissions.find_active(id).cloned())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Permission>, AppError> {
        let tables = self.db.read().await;
        Ok(tables
            .permissions
            .find_active_by(|p| p.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    /// Active permissions among `ids`, in id order
    pub async fn find_many(&self, ids: &BTreeSet<i64>) -> Result<Vec<Permission>, AppError> {
        let tables = self.db.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.permissions.find_active(*id).cloned())
            .collect())
    }

    /// 创建权限
    pub async fn insert(&self, permission: Permission) -> Result<Permission, AppError> {
        let mut tables = self.db.write().await;

        if tables
            .permissions
            .find_active_by(|p| p.name.eq_ignore_ascii_case(&permission.name))
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.name
            )));
        }

        Ok(tables.permissions.insert(permission))
    }

    /// 更新权限
    pub async fn update(&self, permission: Permission) -> Result<Permission, AppError> {
        let mut tables = self.db.write().await;

        if tables
            .permissions
            .find_active_by(|p| {
                p.name.eq_ignore_ascii_case(&permission.name) && p.id != permission.id
            })
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.name
            )));
        }

        if !tables.permissions.replace(permission.clone()) {
            return Err(AppError::NotFound(format!("permission {}", permission.id)));
        }

        Ok(permission)
    }

    /// 软删除权限
    pub async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.db.write().await;
        Ok(tables.permissions.soft_delete(id))
    }
}
