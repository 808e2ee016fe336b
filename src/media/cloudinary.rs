//! Cloudinary-compatible media store client
//!
//! Uploads go to the image upload endpoint as signed multipart requests.
//! Every upload is normalized on the host side: fixed jpg output, 800x600
//! fill crop, automatic quality. Public ids are derived from the current
//! time under the configured folder, which keeps them collision-resistant
//! without any local state.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::MediaConfig;
use crate::errors::MediaError;

use super::{MediaStore, UploadedImage};

const TRANSFORMATION: &str = "c_fill,h_600,w_800/q_auto";
const OUTPUT_FORMAT: &str = "jpg";

pub struct CloudinaryMediaStore {
    client: reqwest::Client,
    config: MediaConfig,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadApiResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DestroyApiResponse {
    result: Option<String>,
    error: Option<ApiErrorBody>,
}

impl CloudinaryMediaStore {
    pub fn new(config: MediaConfig) -> Result<Self, MediaError> {
        let base_url = format!("https://api.cloudinary.com/v1_1/{}", config.cloud_name);
        Self::with_base_url(config, base_url)
    }

    /// Construct against an explicit endpoint; used by tests to point the
    /// client at a local stub server.
    pub fn with_base_url(config: MediaConfig, base_url: String) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Sign request parameters: sorted `key=value` pairs joined with `&`,
    /// the API secret appended, SHA-256 hashed, hex encoded.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn timestamp_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, local_file: &Path) -> Result<UploadedImage, MediaError> {
        let data = tokio::fs::read(local_file).await?;
        let file_name = local_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let public_id = format!("school_{}", Self::timestamp_millis());
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let signed_params = [
            ("folder", self.config.folder.as_str()),
            ("format", OUTPUT_FORMAT),
            ("overwrite", "true"),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("transformation", TRANSFORMATION),
        ];
        let signature = self.sign(&signed_params);

        let mut form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(data).file_name(file_name),
        );
        for (key, value) in signed_params {
            form = form.text(key, value.to_string());
        }
        form = form
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        debug!(public_id = %public_id, "Uploading image to media store");

        let response = self
            .client
            .post(format!("{}/image/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body: UploadApiResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(MediaError::rejected(error.message));
        }
        match (body.secure_url, body.public_id) {
            (Some(url), Some(public_id)) if status.is_success() => {
                Ok(UploadedImage { url, public_id })
            }
            _ => Err(MediaError::rejected(format!(
                "Unexpected upload response (status {status})"
            ))),
        }
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signed_params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = self.sign(&signed_params);

        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(format!("{}/image/destroy", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let body: DestroyApiResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(MediaError::rejected(error.message));
        }
        match body.result.as_deref() {
            Some("ok") | Some("not found") => Ok(()),
            other => Err(MediaError::rejected(format!(
                "Unexpected destroy result: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Multipart, State},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    fn test_config() -> MediaConfig {
        MediaConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder: "school-registry/schools".to_string(),
        }
    }

    fn test_store() -> CloudinaryMediaStore {
        CloudinaryMediaStore::new(test_config()).unwrap()
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn store_against(base_url: String) -> CloudinaryMediaStore {
        CloudinaryMediaStore::with_base_url(test_config(), base_url).unwrap()
    }

    async fn staged_image(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let file = dir.path().join("school.jpg");
        tokio::fs::write(&file, b"jpeg-bytes").await.unwrap();
        file
    }

    type FieldLog = Arc<Mutex<Vec<String>>>;

    async fn recording_upload_stub(
        State(fields): State<FieldLog>,
        mut multipart: Multipart,
    ) -> Json<Value> {
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().map(str::to_string);
            let _ = field.bytes().await.unwrap();
            if let Some(name) = name {
                fields.lock().unwrap().push(name);
            }
        }
        Json(json!({
            "secure_url": "https://res.media.test/demo/image/upload/school_1.jpg",
            "public_id": "school-registry/schools/school_1"
        }))
    }

    #[tokio::test]
    async fn upload_posts_a_named_file_part_and_signed_fields() {
        let fields: FieldLog = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .route("/image/upload", post(recording_upload_stub))
            .with_state(fields.clone());
        let base_url = spawn_stub(router).await;

        let dir = tempfile::tempdir().unwrap();
        let file = staged_image(&dir).await;

        let uploaded = store_against(base_url).upload(&file).await.unwrap();
        assert_eq!(uploaded.public_id, "school-registry/schools/school_1");
        assert!(uploaded.url.starts_with("https://res.media.test/"));

        let seen = fields.lock().unwrap();
        for expected in [
            "file",
            "api_key",
            "signature",
            "signature_algorithm",
            "timestamp",
            "public_id",
            "folder",
            "format",
            "overwrite",
            "transformation",
        ] {
            assert!(
                seen.iter().any(|f| f == expected),
                "missing form field {expected}, saw {seen:?}"
            );
        }
    }

    #[tokio::test]
    async fn upload_error_payload_maps_to_rejection() {
        async fn stub() -> Json<Value> {
            Json(json!({"error": {"message": "Invalid Signature"}}))
        }
        let base_url = spawn_stub(Router::new().route("/image/upload", post(stub))).await;

        let dir = tempfile::tempdir().unwrap();
        let file = staged_image(&dir).await;

        let err = store_against(base_url).upload(&file).await.unwrap_err();
        assert!(matches!(err, MediaError::Rejected { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn destroy_treats_missing_assets_as_success() {
        async fn stub() -> Json<Value> {
            Json(json!({"result": "not found"}))
        }
        let base_url = spawn_stub(Router::new().route("/image/destroy", post(stub))).await;

        store_against(base_url).delete("schools/gone").await.unwrap();
    }

    #[test]
    fn signature_is_deterministic_and_order_independent() {
        let store = test_store();
        let a = store.sign(&[("timestamp", "100"), ("public_id", "school_1")]);
        let b = store.sign(&[("public_id", "school_1"), ("timestamp", "100")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_covers_the_secret() {
        let store = test_store();
        let config = MediaConfig {
            api_secret: "other-secret".to_string(),
            ..store.config.clone()
        };
        let other = CloudinaryMediaStore::new(config).unwrap();
        let params = [("timestamp", "100")];
        assert_ne!(store.sign(&params), other.sign(&params));
    }
}
