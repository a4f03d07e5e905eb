//! Authentication and authorization module

pub mod context;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use context::{Principal, SecurityContext};
pub use jwt::{Claims, DecodedClaims, JwtService};
pub use middleware::{extract_token, request_gate, PublicPaths, RequestGate};
pub use password::PasswordHasher;
pub use policy::{require_owner_or_role, Requirement};
