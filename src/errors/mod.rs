//! Error handling for the school registry
//!
//! This module centralizes the error types used across the service layers
//! and provides the `AppResult` alias used by most fallible operations.

pub mod types;

pub use types::{AppError, FieldViolation, MediaError};

/// Convenience result alias for application operations
pub type AppResult<T> = Result<T, AppError>;
