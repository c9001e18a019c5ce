//! # AppError
//!
//! Centralized error handling for the Rusty-Press ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all rp-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Group slug, username, post id, follow edge)
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Validation failure (e.g., empty post text, oversized slug)
    #[error("validation error: {0}")]
    Validation(String),

    /// Security/Auth failure (e.g., bad credentials, tampered session cookie)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate username or group slug)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, template render fault)
    #[error("internal service error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A specialized Result type for Rusty-Press logic.
pub type Result<T> = std::result::Result<T, AppError>;
