//! 博客服务库
//! 基于角色的 JWT 认证与授权，守护用户、作者、文章、角色与权限的增删改查

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
