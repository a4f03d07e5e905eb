//! Business logic services layer

pub mod auth_service;
pub mod blog_service;
pub mod bootstrap;
pub mod identity_service;
pub mod role_service;
pub mod user_service;

pub use auth_service::{AuthService, LoginOutcome};
pub use blog_service::BlogService;
pub use identity_service::{AuthClaims, IdentityResolver, ResolvedAccount};
pub use role_service::RoleService;
pub use user_service::UserService;
