//! 内存存储
//! 以 i64 为键的表，实体之间只通过 id 引用；所有行软删除，不做物理删除

use crate::models::{author::Author, post::Post, role::Permission, role::Role, user::Credential};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Row stored in a [`Table`]
pub trait Record: Clone {
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn is_deleted(&self) -> bool;
    fn mark_deleted(&mut self);
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                fn id(&self) -> i64 {
                    self.id
                }

                fn set_id(&mut self, id: i64) {
                    self.id = id;
                }

                fn is_deleted(&self) -> bool {
                    self.deleted
                }

                fn mark_deleted(&mut self) {
                    self.deleted = true;
                }
            }
        )*
    };
}

impl_record!(Credential, Role, Permission, Author, Post);

/// Id-keyed table with monotonically allocated ids starting at 1
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Record> Table<T> {
    /// Row by id, soft-deleted rows excluded
    pub fn find_active(&self, id: i64) -> Option<&T> {
        self.rows.get(&id).filter(|row| !row.is_deleted())
    }

    /// Row by id, soft-deleted rows included
    pub fn find_any(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn find_active_by<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.rows
            .values()
            .find(|row| !row.is_deleted() && predicate(*row))
    }

    pub fn find_any_by<P>(&self, predicate: P) -> Option<&T>
    where
        P: FnMut(&&T) -> bool,
    {
        self.rows.values().find(predicate)
    }

    /// Active rows in id order
    pub fn list_active(&self) -> Vec<T> {
        self.rows
            .values()
            .filter(|row| !row.is_deleted())
            .cloned()
            .collect()
    }

    /// Assign the next id and store the row
    pub fn insert(&mut self, mut row: T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        row.set_id(id);
        self.rows.insert(id, row.clone());
        row
    }

    /// Replace an existing row; returns `false` if the id is unknown
    pub fn replace(&mut self, row: T) -> bool {
        match self.rows.get_mut(&row.id()) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    /// Soft delete an active row; returns `false` if there is none
    pub fn soft_delete(&mut self, id: i64) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) if !row.is_deleted() => {
                row.mark_deleted();
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All tables of the service
#[derive(Debug, Default)]
pub struct Tables {
    pub credentials: Table<Credential>,
    pub roles: Table<Role>,
    pub permissions: Table<Permission>,
    pub authors: Table<Author>,
    pub posts: Table<Post>,
}

/// 存储句柄，克隆开销很小
#[derive(Debug, Clone, Default)]
pub struct Db {
    inner: Arc<RwLock<Tables>>,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().await
    }
}

/// 健康状态
#[derive(Debug, Clone)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

/// 存储健康检查
pub async fn health_check(db: &Db) -> HealthStatus {
    let tables = db.read().await;
    tracing::debug!(
        credentials = tables.credentials.len(),
        roles = tables.roles.len(),
        "Store health check"
    );

    if tables.roles.is_empty() {
        return HealthStatus::Unhealthy("no roles seeded".to_string());
    }
    HealthStatus::Healthy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut table = Table::default();
        let a = table.insert(Permission::new("READ"));
        let b = table.insert(Permission::new("CREATE"));

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn test_soft_deleted_rows_hidden_from_active_lookups() {
        let mut table = Table::default();
        let mut row = table.insert(Permission::new("READ"));
        row.deleted = true;
        assert!(table.replace(row));

        assert!(table.find_active(1).is_none());
        assert!(table.find_any(1).is_some());
        assert!(table.list_active().is_empty());
        assert!(table.find_active_by(|p| p.name == "READ").is_none());
    }

    #[test]
    fn test_replace_unknown_id() {
        let mut table: Table<Permission> = Table::default();
        let mut row = Permission::new("READ");
        row.id = 42;
        assert!(!table.replace(row));
    }

    #[tokio::test]
    async fn test_health_check() {
        let db = Db::new();
        assert!(matches!(health_check(&db).await, HealthStatus::Unhealthy(_)));

        db.write().await.roles.insert(Role::new("USER", Default::default()));
        assert!(matches!(health_check(&db).await, HealthStatus::Healthy));
    }
}
