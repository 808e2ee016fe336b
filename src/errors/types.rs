//! Error type definitions for the school registry service
//!
//! The taxonomy mirrors what the HTTP boundary needs to report: aggregated
//! validation failures, media upload failures, duplicate-email conflicts,
//! missing records, and everything else as an internal failure whose detail
//! is logged but never echoed to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A single violated field constraint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Field-level validation failures, always aggregated
    #[error("Validation failed")]
    Validation { violations: Vec<FieldViolation> },

    /// Media store rejected or failed the image upload
    #[error("Failed to upload image: {message}")]
    Upload { message: String },

    /// Duplicate email conflict
    #[error("{message}")]
    Conflict { message: String },

    /// Resource lookup miss
    #[error("{resource} with id {id} not found")]
    NotFound { resource: String, id: String },

    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Media store transport errors not tied to a single upload attempt
    #[error("Media store error: {0}")]
    Media(#[from] MediaError),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a validation error from a list of violations
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self::Validation { violations }
    }

    /// Create a validation error for a single field
    pub fn validation_single<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            violations: vec![FieldViolation::new(field, message)],
        }
    }

    pub fn upload<S: Into<String>>(message: S) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn not_found<R: Into<String>, I: ToString>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Media store adapter errors
#[derive(Error, Debug)]
pub enum MediaError {
    /// Transport failure talking to the media host
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The media host answered with an error payload
    #[error("Upload rejected: {message}")]
    Rejected { message: String },

    /// Local file could not be read for upload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}
