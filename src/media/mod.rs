//! Media store adapter
//!
//! Wraps the external image-hosting service behind the `MediaStore` trait so
//! the write pipeline only sees an upload/delete capability. The production
//! implementation is a Cloudinary-compatible client; tests substitute their
//! own implementations.

use async_trait::async_trait;
use std::path::Path;

use crate::errors::MediaError;

pub mod cloudinary;

pub use cloudinary::CloudinaryMediaStore;

/// Result of a successful image upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Publicly reachable URL of the hosted image
    pub url: String,
    /// Host-side identifier, usable for later deletion
    pub public_id: String,
}

/// Opaque upload/delete capability over an external image host
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a local file, returning its hosted URL and identifier.
    /// Single attempt, no retries.
    async fn upload(&self, local_file: &Path) -> Result<UploadedImage, MediaError>;

    /// Delete a previously uploaded image by its host-side identifier.
    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}
