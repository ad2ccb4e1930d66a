// handlers/mod.rs - one module per resource collection plus the shared CRUD
// plumbing they delegate to.

pub mod auth;
pub mod crud;
pub mod project_files;
pub mod projects;
pub mod service;
pub mod user_tokens;
pub mod users;
