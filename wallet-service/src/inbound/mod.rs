//! Inbound HTTP adapter (axum).

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{AuthKeys, AuthUser};
pub use server::HttpServer;
