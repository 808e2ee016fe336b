//! School record service
//!
//! Owns the create/update/delete write pipeline and the listing/lookup
//! query path. The write pipeline runs a fixed sequence with compensating
//! cleanup: validate, upload the staged image, drop the staging file,
//! check email uniqueness, persist. Side effects get a single attempt
//! each; there are no retries.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::database::repositories::SchoolRepository;
use crate::errors::{AppError, AppResult};
use crate::media::MediaStore;
use crate::models::{School, SchoolInput};
use crate::services::temp_file::TempUpload;

/// One page of listing results plus the filter-wide totals
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SchoolPage {
    pub schools: Vec<School>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

pub struct SchoolService {
    repository: SchoolRepository,
    media_store: Arc<dyn MediaStore>,
}

impl SchoolService {
    pub fn new(repository: SchoolRepository, media_store: Arc<dyn MediaStore>) -> Self {
        Self {
            repository,
            media_store,
        }
    }

    /// Create a school record from validated input and a staged image.
    ///
    /// The staged file is removed on every exit path: explicitly right
    /// after the upload attempt, or by the guard's drop on the early
    /// returns before it.
    pub async fn create(
        &self,
        input: SchoolInput,
        image: Option<TempUpload>,
    ) -> AppResult<School> {
        let fields = input.validate().map_err(AppError::validation)?;

        let Some(image) = image else {
            return Err(AppError::validation_single(
                "image",
                "School image is required",
            ));
        };

        let upload_result = self.media_store.upload(image.path()).await;
        image.remove().await;

        let uploaded = upload_result.map_err(|e| AppError::upload(e.to_string()))?;
        debug!(url = %uploaded.url, "Image uploaded");

        if self
            .repository
            .find_by_email(&fields.email_id)
            .await?
            .is_some()
        {
            // Known gap: the freshly uploaded image is not rolled back here.
            return Err(AppError::conflict(
                "A school with this email already exists",
            ));
        }

        match self.repository.create(&fields, &uploaded.url).await {
            Ok(school) => {
                info!(id = school.id, name = %school.name, "School created");
                Ok(school)
            }
            Err(err @ AppError::Conflict { .. }) => Err(err),
            Err(err) => {
                // The row never landed, so the fresh upload is orphaned.
                // Compensate best-effort; failure only gets logged.
                if let Err(delete_err) = self.media_store.delete(&uploaded.public_id).await {
                    warn!(
                        public_id = %uploaded.public_id,
                        error = %delete_err,
                        "Failed to delete orphaned image after insert failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// Update a school record, optionally replacing its image.
    ///
    /// A failed upload of a replacement image keeps the previous URL and
    /// stays silent toward the caller; it is only logged.
    pub async fn update(
        &self,
        id: i32,
        input: SchoolInput,
        image: Option<TempUpload>,
    ) -> AppResult<School> {
        let fields = input.validate().map_err(AppError::validation)?;

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("School", id))?;

        let image_url = match image {
            Some(image) => {
                let upload_result = self.media_store.upload(image.path()).await;
                image.remove().await;
                match upload_result {
                    Ok(uploaded) => uploaded.url,
                    Err(e) => {
                        warn!(id, error = %e, "Image upload failed during update; keeping previous image");
                        existing.image.clone()
                    }
                }
            }
            None => existing.image.clone(),
        };

        let school = self.repository.update(id, &fields, &image_url).await?;
        info!(id = school.id, "School updated");
        Ok(school)
    }

    /// Delete a school record. The hosted image is not touched; the schema
    /// stores only the image URL.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::not_found("School", id));
        }
        info!(id, "School deleted");
        Ok(())
    }

    pub async fn get(&self, id: i32) -> AppResult<School> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("School", id))
    }

    /// Paginated listing with optional case-insensitive search across
    /// name, city, and state. `page` and `limit` arrive pre-clamped from
    /// the web layer.
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        search: Option<&str>,
    ) -> AppResult<SchoolPage> {
        let term = search.map(str::trim).filter(|t| !t.is_empty());
        let limit = limit.max(1);
        // OFFSET is bound as a signed 64-bit value downstream.
        let offset = page
            .saturating_sub(1)
            .saturating_mul(limit)
            .min(i64::MAX as u64);

        let (schools, total) = self.repository.list(term, offset, limit).await?;

        let total_pages = std::cmp::max(1, total.div_ceil(limit));

        Ok(SchoolPage {
            schools,
            page,
            limit,
            total,
            total_pages,
        })
    }
}
