//! School HTTP handlers
//!
//! Thin wrappers around the service layer: multipart parsing and staging
//! happen here, everything else is delegated. Scalar form fields map onto
//! `SchoolInput`; the `image` field is staged to local disk behind a
//! `TempUpload` guard before the pipeline runs.

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::SchoolInput;
use crate::services::TempUpload;
use crate::web::{
    AppState,
    extractors::ListParams,
    responses::{Pagination, bad_request, created, handle_error, ok, ok_page},
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

/// Parsed multipart form: scalar fields plus an optionally staged image
struct SchoolForm {
    input: SchoolInput,
    image: Option<TempUpload>,
}

/// Read the multipart form, staging the image field to disk. Returns an
/// error response for transport-level problems (malformed multipart,
/// non-image content type, oversized upload).
async fn parse_school_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<SchoolForm, Response> {
    let mut input = SchoolInput::default();
    let mut image: Option<TempUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("Invalid multipart form data"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if !content_type.starts_with("image/") {
                    return Err(bad_request("Only image files are allowed"));
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|_| bad_request("Failed to read image upload"))?;
                if data.len() > state.max_upload_size {
                    return Err(bad_request("Image exceeds the maximum upload size"));
                }

                let staged = TempUpload::stage(&state.upload_path, &file_name, &data)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Failed to stage image upload");
                        handle_error(crate::errors::AppError::internal(
                            "Failed to stage image upload",
                        ))
                    })?;
                image = Some(staged);
            }
            Some(name) => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| bad_request("Invalid multipart form data"))?;
                let value = String::from_utf8_lossy(&data).to_string();
                match name {
                    "name" => input.name = value,
                    "address" => input.address = value,
                    "city" => input.city = value,
                    "state" => input.state = value,
                    "contact" => input.contact = value,
                    "email_id" => input.email_id = value,
                    _ => {}
                }
            }
            None => {}
        }
    }

    Ok(SchoolForm { input, image })
}

/// Create a new school record
#[utoipa::path(
    post,
    path = "/api/schools",
    tag = "schools",
    request_body(content = String, description = "Multipart form: name, address, city, state, contact, email_id, image (file)"),
    responses(
        (status = 201, description = "School created successfully"),
        (status = 400, description = "Validation, upload, or duplicate-email failure"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn create_school(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match parse_school_form(&state, multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    match state.school_service.create(form.input, form.image).await {
        Ok(school) => created(school),
        Err(e) => handle_error(e),
    }
}

/// List schools with pagination and optional search
#[utoipa::path(
    get,
    path = "/api/schools",
    tag = "schools",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, defaults to 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (defaults to 10, max 100)"),
        ("search" = Option<String>, Query, description = "Substring match against name, city, or state"),
    ),
    responses(
        (status = 200, description = "Page of schools, pagination metadata beside the data array"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn list_schools(
    State(state): State<AppState>,
    axum::extract::Query(params): axum::extract::Query<ListParams>,
) -> Response {
    match state
        .school_service
        .list(params.page(), params.limit(), params.search())
        .await
    {
        Ok(page) => ok_page(
            page.schools,
            Pagination {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
        ),
        Err(e) => handle_error(e),
    }
}

/// Get a single school by id
#[utoipa::path(
    get,
    path = "/api/schools/{id}",
    tag = "schools",
    params(("id" = i32, Path, description = "School id")),
    responses(
        (status = 200, description = "School details"),
        (status = 404, description = "School not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_school(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.school_service.get(id).await {
        Ok(school) => ok(school),
        Err(e) => handle_error(e),
    }
}

/// Update an existing school; the image file is optional
#[utoipa::path(
    put,
    path = "/api/schools/{id}",
    tag = "schools",
    params(("id" = i32, Path, description = "School id")),
    request_body(content = String, description = "Multipart form: scalar fields required, image optional"),
    responses(
        (status = 200, description = "School updated successfully"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "School not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn update_school(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Response {
    let form = match parse_school_form(&state, multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    match state.school_service.update(id, form.input, form.image).await {
        Ok(school) => ok(school),
        Err(e) => handle_error(e),
    }
}

/// Delete a school
#[utoipa::path(
    delete,
    path = "/api/schools/{id}",
    tag = "schools",
    params(("id" = i32, Path, description = "School id")),
    responses(
        (status = 200, description = "School deleted"),
        (status = 404, description = "School not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn delete_school(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.school_service.delete(id).await {
        Ok(()) => ok(DeleteResponse {
            message: "School deleted successfully".to_string(),
        }),
        Err(e) => handle_error(e),
    }
}
