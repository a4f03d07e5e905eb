//! 数据模型模块
//! 用户、角色与权限、作者、文章

pub mod auth;
pub mod author;
pub mod post;
pub mod role;
pub mod user;
