//! 启动时写入默认角色、权限与管理员账户（幂等）

use crate::{
    auth::{password::PasswordHasher, policy},
    config::AppConfig,
    db::Db,
    error::AppError,
    models::{
        role::{Permission, Role},
        user::Credential,
    },
    repository::{PermissionRepository, RoleRepository, UserRepository},
};
use secrecy::ExposeSecret;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_PERMISSIONS: [&str; 5] = ["CREATE", "READ", "UPDATE", "DELETE", "PUBLISH"];

/// Default roles and the permission names they carry
pub fn default_role_grants() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (policy::ADMIN, DEFAULT_PERMISSIONS.to_vec()),
        (policy::USER, vec!["READ"]),
        (policy::AUTHOR, vec!["CREATE", "READ", "UPDATE", "PUBLISH"]),
    ]
}

/// Seed permissions, roles and the optional administrator
pub async fn seed_defaults(
    db: &Db,
    password_hasher: &PasswordHasher,
    config: &AppConfig,
) -> Result<(), AppError> {
    let permission_repo = PermissionRepository::new(db.clone());
    let role_repo = RoleRepository::new(db.clone());
    let user_repo = UserRepository::new(db.clone());

    let mut permission_ids = BTreeMap::new();
    for name in DEFAULT_PERMISSIONS {
        let permission = match permission_repo.find_by_name(name).await? {
            Some(existing) => existing,
            None => permission_repo.insert(Permission::new(name)).await?,
        };
        permission_ids.insert(name, permission.id);
    }

    for (role_name, grants) in default_role_grants() {
        if role_repo.find_by_name(role_name).await?.is_some() {
            continue;
        }
        let ids: BTreeSet<i64> = grants
            .iter()
            .filter_map(|name| permission_ids.get(name).copied())
            .collect();
        role_repo.insert(Role::new(role_name, ids)).await?;
        tracing::debug!(role = role_name, "Seeded role");
    }

    let Some(admin_password) = &config.bootstrap.admin_password else {
        tracing::info!("No bootstrap admin password configured, skipping admin account");
        return Ok(());
    };

    let admin_username = &config.bootstrap.admin_username;
    if user_repo.find_by_username(admin_username).await?.is_some() {
        return Ok(());
    }

    let admin_role = role_repo
        .find_by_name(policy::ADMIN)
        .await?
        .ok_or_else(|| AppError::Internal("ADMIN role missing after seeding".to_string()))?;

    let password_hash = password_hasher
        .hash_blocking(admin_password.expose_secret().clone())
        .await?;
    let (admin, created) = user_repo
        .insert_if_absent(Credential::new(
            admin_username.clone(),
            password_hash,
            BTreeSet::from([admin_role.id]),
        ))
        .await?;

    if created {
        tracing::info!(username = %admin.username, "Bootstrap admin account created");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grants_reference_known_permissions() {
        for (_, grants) in default_role_grants() {
            for grant in grants {
                assert!(DEFAULT_PERMISSIONS.contains(&grant));
            }
        }
    }
}
