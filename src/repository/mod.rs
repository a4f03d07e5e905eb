//! Repository layer over the in-memory store

pub mod author_repo;
pub mod permission_repo;
pub mod post_repo;
pub mod role_repo;
pub mod user_repo;

pub use author_repo::*;
pub use permission_repo::*;
pub use post_repo::*;
pub use role_repo::*;
pub use user_repo::*;
