//! Request middleware: authentication and metrics.

pub mod auth;
pub mod metrics;

pub use auth::AuthAccount;
