//! HTTP response types and utilities
//!
//! Standardized response envelope and error mapping for the web layer.
//! Internal failure detail (database, media transport) is logged here and
//! replaced with a generic message before it reaches callers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, FieldViolation};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Itemized validation violations (present on validation failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
    /// Pagination metadata (present on listing responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Pagination metadata carried beside the listing `data` array
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
            pagination: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success_with_pagination(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
            pagination: Some(pagination),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: None,
            pagination: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_with_details(message: String, details: Vec<FieldViolation>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: Some(details),
            pagination: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Convert an `AppError` to its HTTP response
pub fn handle_error(error: AppError) -> Response {
    let (status, body) = match error {
        AppError::Validation { violations } => (
            StatusCode::BAD_REQUEST,
            ApiResponse::<()>::error_with_details("Validation failed".to_string(), violations),
        ),
        AppError::Upload { message } => (
            StatusCode::BAD_REQUEST,
            ApiResponse::<()>::error(format!("Failed to upload image: {message}")),
        ),
        AppError::Conflict { message } => {
            (StatusCode::BAD_REQUEST, ApiResponse::<()>::error(message))
        }
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            ApiResponse::<()>::error(format!("{resource} with id '{id}' not found")),
        ),
        AppError::Database(e) => {
            tracing::error!(error = %e, "Database operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::<()>::error("Database operation failed".to_string()),
            )
        }
        AppError::Media(e) => {
            tracing::error!(error = %e, "Media store operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::<()>::error("Media store operation failed".to_string()),
            )
        }
        AppError::Internal { message } => {
            tracing::error!(message, "Internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::<()>::error("Internal server error".to_string()),
            )
        }
    };

    (status, Json(body)).into_response()
}

/// Success response helpers
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

pub fn ok_page<T: Serialize>(data: T, pagination: Pagination) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success_with_pagination(data, pagination)),
    )
        .into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

pub fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(message.to_string())),
    )
        .into_response()
}
