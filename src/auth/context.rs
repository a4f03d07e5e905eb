//! Per-request security context

use crate::auth::jwt::DecodedClaims;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use std::collections::BTreeSet;
use std::convert::Infallible;

/// Prefix that marks an authority as a role
pub const ROLE_PREFIX: &str = "ROLE_";

/// Authenticated caller: username plus granted authorities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub authorities: BTreeSet<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>, authorities: BTreeSet<String>) -> Self {
        Self {
            username: username.into(),
            authorities,
        }
    }

    /// Returns `true` if the principal holds the exact authority string.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// Returns `true` if the principal holds `ROLE_<role>`.
    pub fn has_role(&self, role: &str) -> bool {
        self.authorities.contains(&format!("{}{}", ROLE_PREFIX, role))
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    pub fn has_all_roles(&self, roles: &[&str]) -> bool {
        roles.iter().all(|role| self.has_role(role))
    }

    /// Role authorities only, e.g. `ROLE_ADMIN`
    pub fn roles(&self) -> Vec<String> {
        self.authorities
            .iter()
            .filter(|a| a.starts_with(ROLE_PREFIX))
            .cloned()
            .collect()
    }
}

impl From<DecodedClaims> for Principal {
    fn from(claims: DecodedClaims) -> Self {
        Self::new(claims.subject, claims.authorities)
    }
}

/// Security context attached to a request by the request gate.
///
/// The state is decided once per request; handlers read it through the
/// extractor and never mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SecurityContext {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl SecurityContext {
    pub fn authenticated(principal: Principal) -> Self {
        SecurityContext::Authenticated(principal)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, SecurityContext::Anonymous)
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SecurityContext::Authenticated(principal) => Some(principal),
            SecurityContext::Anonymous => None,
        }
    }
}

// A missing extension means the gate did not authenticate the request
impl<S> FromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_default())
    }
}
