//! Role repository (角色数据访问)

use crate::{db::Db, error::AppError, models::role::Role};
use std::collections::BTreeSet;

pub struct RoleRepository {
    db: Db,
}

impl RoleRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// 列出所有未删除的角色
    pub async fn list(&self) -> Result<Vec<Role>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.roles.list_active())
    }

    /// 根据名称查找角色（名称不区分大小写）
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let tables = self.db.read().await;
        Ok(tables
            .roles
            .find_active_by(|r| r.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    /// 根据 ID 查找角色
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.roles.find_active(id).cloned())
    }

    pub async fn find_by_id_including_deleted(&self, id: i64) -> Result<Option<Role>, AppError> {
        let tables = self.db.read().await;
        Ok(tables.roles.find_any(id).cloned())
    }

    /// Active roles among `ids`, in id order
    pub async fn find_many(&self, ids: &BTreeSet<i64>) -> Result<Vec<Role>, AppError> {
        let tables = self.db.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.roles.find_active(*id).cloned())
            .collect())
    }

    /// 创建角色
    pub async fn insert(&self, role: Role) -> Result<Role, AppError> {
        let mut tables = self.db.write().await;

        if tables
            .roles
            .find_active_by(|r| r.name.eq_ignore_ascii_case(&role.name))
            .is_some()
        {
            return Err(AppError::Conflict(format!("role '{}' already exists", role.name)));
        }

        Ok(tables.roles.insert(role))
    }

    /// 更新角色
    pub async fn update(&self, role: Role) -> Result<Role, AppError> {
        let mut tables = self.db.write().await;

        if tables
            .roles
            .find_active_by(|r| r.name.eq_ignore_ascii_case(&role.name) && r.id != role.id)
            .is_some()
        {
            return Err(AppError::Conflict(format!("role '{}' already exists", role.name)));
        }

        if !tables.roles.replace(role.clone()) {
            return Err(AppError::NotFound(format!("role {}", role.id)));
        }

        Ok(role)
    }

    /// 软删除角色
    pub async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.db.write().await;
        Ok(tables.roles.soft_delete(id))
    }
}
