//! HTTP 处理器模块

pub mod auth;
pub mod author;
pub mod health;
pub mod post;
pub mod role;
pub mod user;
