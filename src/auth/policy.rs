//! Authorization predicates evaluated by handlers before the operation body

use crate::{
    auth::context::{Principal, SecurityContext},
    error::AppError,
};

pub const ADMIN: &str = "ADMIN";
pub const USER: &str = "USER";
pub const AUTHOR: &str = "AUTHOR";

/// Declared requirement of a protected operation
#[derive(Debug, Clone, Copy)]
pub enum Requirement {
    /// Any authenticated caller
    Authenticated,
    /// At least one of the roles (names without the `ROLE_` prefix)
    AnyRole(&'static [&'static str]),
    /// Every listed role
    AllRoles(&'static [&'static str]),
    /// At least one raw authority, e.g. a permission name
    AnyAuthority(&'static [&'static str]),
}

impl Requirement {
    /// Anonymous callers get `Unauthorized`, authenticated callers that fail
    /// the predicate get `Forbidden`.
    pub fn check<'a>(&self, ctx: &'a SecurityContext) -> Result<&'a Principal, AppError> {
        let principal = ctx.principal().ok_or(AppError::Unauthorized)?;

        let allowed = match self {
            Requirement::Authenticated => true,
            Requirement::AnyRole(roles) => principal.has_any_role(roles),
            Requirement::AllRoles(roles) => principal.has_all_roles(roles),
            Requirement::AnyAuthority(authorities) => authorities
                .iter()
                .any(|authority| principal.has_authority(authority)),
        };

        if !allowed {
            tracing::warn!(
                username = %principal.username,
                requirement = ?self,
                "Authorization denied"
            );
            return Err(AppError::Forbidden);
        }

        Ok(principal)
    }
}

/// Ownership predicate: the caller owns the resource or holds `role`
pub fn require_owner_or_role(
    principal: &Principal,
    owner_username: &str,
    role: &str,
) -> Result<(), AppError> {
    if principal.has_role(role) || principal.username == owner_username {
        return Ok(());
    }

    tracing::warn!(
        username = %principal.username,
        owner = %owner_username,
        "Ownership check failed"
    );
    Err(AppError::Forbidden)
}
