//! Identity resolution: username to credential plus authority set
//!
//! Authorities are `ROLE_<name>` for every active role of the user and the
//! name of every active permission carried by those roles.

use crate::{
    auth::context::ROLE_PREFIX,
    db::Db,
    error::AppError,
    models::{
        role::{Permission, Role},
        user::Credential,
    },
    repository::user_repo::UserRepository,
};
use std::collections::BTreeSet;

/// Username with the authority set derived from its roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub username: String,
    pub authorities: BTreeSet<String>,
}

/// Credential together with its resolved claims
#[derive(Debug, Clone)]
pub struct ResolvedAccount {
    pub credential: Credential,
    pub claims: AuthClaims,
}

/// Expand roles and their permissions into the authority set.
///
/// Soft-deleted roles contribute nothing; soft-deleted permissions are skipped.
/// Only permissions referenced by an active role are considered.
pub fn expand_authorities(roles: &[Role], permissions: &[Permission]) -> BTreeSet<String> {
    let mut authorities = BTreeSet::new();

    for role in roles.iter().filter(|r| !r.deleted) {
        authorities.insert(format!("{}{}", ROLE_PREFIX, role.name));

        for permission in permissions
            .iter()
            .filter(|p| !p.deleted && role.permission_ids.contains(&p.id))
        {
            authorities.insert(permission.name.clone());
        }
    }

    authorities
}

/// Status flags, checked in a fixed order
pub fn check_account_status(credential: &Credential) -> Result<(), AppError> {
    if !credential.enabled {
        return Err(AppError::AccountDisabled);
    }
    if !credential.account_not_locked {
        return Err(AppError::AccountLocked);
    }
    if !credential.account_not_expired {
        return Err(AppError::AccountExpired);
    }
    if !credential.credential_not_expired {
        return Err(AppError::CredentialsExpired);
    }
    Ok(())
}

#[derive(Clone)]
pub struct IdentityResolver {
    db: Db,
}

impl IdentityResolver {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Credential and claims of an active user
    pub async fn load_account(&self, username: &str) -> Result<ResolvedAccount, AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        let grants = user_repo.find_grants(username).await?.ok_or_else(|| {
            tracing::debug!(username = %username, "No active credential");
            AppError::NotFound(format!("user '{}'", username))
        })?;

        let authorities = expand_authorities(&grants.roles, &grants.permissions);

        Ok(ResolvedAccount {
            claims: AuthClaims {
                username: grants.credential.username.clone(),
                authorities,
            },
            credential: grants.credential,
        })
    }

    /// Authority set of an active user
    pub async fn load_authorities(&self, username: &str) -> Result<AuthClaims, AppError> {
        Ok(self.load_account(username).await?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, name: &str, permission_ids: &[i64]) -> Role {
        let mut role = Role::new(name, permission_ids.iter().copied().collect());
        role.id = id;
        role
    }

    fn permission(id: i64, name: &str) -> Permission {
        let mut permission = Permission::new(name);
        permission.id = id;
        permission
    }

    #[test]
    fn test_expand_authorities() {
        let roles = vec![role(1, "AUTHOR", &[1, 2]), role(2, "USER", &[2])];
        let permissions = vec![permission(1, "PUBLISH"), permission(2, "READ")];

        let authorities = expand_authorities(&roles, &permissions);

        let expected: BTreeSet<String> = ["PUBLISH", "READ", "ROLE_AUTHOR", "ROLE_USER"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(authorities, expected);
    }

    #[test]
    fn test_deleted_role_and_permission_are_ignored() {
        let mut deleted_role = role(2, "ADMIN", &[3]);
        deleted_role.deleted = true;
        let mut deleted_permission = permission(2, "READ");
        deleted_permission.deleted = true;

        let roles = vec![role(1, "AUTHOR", &[1, 2]), deleted_role];
        let permissions = vec![
            permission(1, "PUBLISH"),
            deleted_permission,
            permission(3, "DELETE"),
        ];

        let authorities = expand_authorities(&roles, &permissions);

        assert!(authorities.contains("ROLE_AUTHOR"));
        assert!(authorities.contains("PUBLISH"));
        assert!(!authorities.contains("READ"));
        assert!(!authorities.contains("ROLE_ADMIN"));
        assert!(!authorities.contains("DELETE"));
    }

    #[test]
    fn test_no_roles_means_no_authorities() {
        assert!(expand_authorities(&[], &[permission(1, "READ")]).is_empty());
    }

    #[test]
    fn test_account_status_order() {
        let mut credential = Credential::new("alice", String::new(), BTreeSet::new());
        assert!(check_account_status(&credential).is_ok());

        credential.credential_not_expired = false;
        assert!(matches!(
            check_account_status(&credential),
            Err(AppError::CredentialsExpired)
        ));

        credential.account_not_expired = false;
        assert!(matches!(
            check_account_status(&credential),
            Err(AppError::AccountExpired)
        ));

        credential.account_not_locked = false;
        assert!(matches!(
            check_account_status(&credential),
            Err(AppError::AccountLocked)
        ));

        credential.enabled = false;
        assert!(matches!(
            check_account_status(&credential),
            Err(AppError::AccountDisabled)
        ));
    }
}
