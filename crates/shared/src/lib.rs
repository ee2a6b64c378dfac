//! Shared types and configuration for fxserve.
//!
//! This crate provides common types used across all other crates:
//! - Configuration management
//! - JWT token service and claims

pub mod auth;
pub mod config;
pub mod jwt;

pub use auth::Claims;
pub use config::AppConfig;
pub use jwt::{JwtError, JwtService};
