//! End-to-end API tests
//!
//! Runs the full router against an in-memory SQLite database and a mock
//! media store, exercising the create/update/delete pipeline, listing,
//! search, pagination clamping, and the error envelope.

use async_trait::async_trait;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use school_registry::{
    config::Config,
    database::Database,
    database::repositories::SchoolRepository,
    errors::MediaError,
    media::{MediaStore, UploadedImage},
    models::SchoolFields,
    services::SchoolService,
    web::WebServer,
};

/// Media store double: hands out fake hosted URLs, can be switched into
/// failure mode, and records every delete call.
struct MockMediaStore {
    fail_uploads: AtomicBool,
    upload_count: AtomicU64,
    deleted: std::sync::Mutex<Vec<String>>,
}

impl MockMediaStore {
    fn new() -> Self {
        Self {
            fail_uploads: AtomicBool::new(false),
            upload_count: AtomicU64::new(0),
            deleted: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn fail_next_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(&self, local_file: &Path) -> Result<UploadedImage, MediaError> {
        assert!(
            local_file.exists(),
            "staged file must exist at upload time"
        );
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::rejected("simulated media outage"));
        }
        let n = self.upload_count.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(UploadedImage {
            url: format!("https://media.test/schools/upload-{n}.jpg"),
            public_id: format!("schools/upload-{n}"),
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

struct TestContext {
    server: TestServer,
    repository: SchoolRepository,
    media: Arc<MockMediaStore>,
    upload_dir: tempfile::TempDir,
}

async fn test_context() -> TestContext {
    let upload_dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    // In-memory SQLite must stay on a single pooled connection.
    config.database.max_connections = Some(1);
    config.storage.upload_path = upload_dir.path().to_path_buf();

    let database = Database::new(&config.database).await.unwrap();
    database.migrate().await.unwrap();

    let media = Arc::new(MockMediaStore::new());
    let repository = SchoolRepository::new(database.connection());
    let service = Arc::new(SchoolService::new(repository.clone(), media.clone()));

    let router = WebServer::router(&config, database, service);
    let server = TestServer::new(router).unwrap();

    TestContext {
        server,
        repository,
        media,
        upload_dir,
    }
}

fn school_form(email: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", "ABC")
        .add_text("address", "123 Main Street")
        .add_text("city", "Metropolis")
        .add_text("state", "NY")
        .add_text("contact", "9876543210")
        .add_text("email_id", email)
        .add_part(
            "image",
            Part::bytes(vec![0xFFu8, 0xD8, 0xFF, 0xE0])
                .file_name("school.jpg")
                .mime_type("image/jpeg"),
        )
}

fn scalar_form(email: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", "ABC")
        .add_text("address", "123 Main Street")
        .add_text("city", "Metropolis")
        .add_text("state", "NY")
        .add_text("contact", "9876543210")
        .add_text("email_id", email)
}

fn staged_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

async fn seed_school(ctx: &TestContext, n: u32, city: &str, state: &str) {
    let fields = SchoolFields {
        name: format!("School {n}"),
        address: format!("{n} Example Avenue"),
        city: city.to_string(),
        state: state.to_string(),
        contact: "9876543210".to_string(),
        email_id: format!("school{n}@example.com"),
    };
    ctx.repository
        .create(&fields, "https://media.test/schools/seed.jpg")
        .await
        .unwrap();
}

#[tokio::test]
async fn create_returns_hosted_url_and_normalized_email() {
    let ctx = test_context().await;

    let response = ctx
        .server
        .post("/api/schools")
        .multipart(school_form(" A@B.Com "))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email_id"], "a@b.com");

    let image = body["data"]["image"].as_str().unwrap();
    assert!(image.starts_with("https://media.test/"), "got {image}");

    // The staged temp file must be gone by the time the request finishes.
    assert_eq!(staged_file_count(ctx.upload_dir.path()), 0);
}

#[tokio::test]
async fn create_without_image_is_a_validation_error() {
    let ctx = test_context().await;

    let response = ctx
        .server
        .post("/api/schools")
        .multipart(scalar_form("a@b.com"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["field"], "image");
    assert_eq!(details[0]["message"], "School image is required");
}

#[tokio::test]
async fn field_violations_are_aggregated_and_precede_upload() {
    let ctx = test_context().await;

    let form = MultipartForm::new()
        .add_text("name", "A")
        .add_text("address", "ab")
        .add_text("city", "")
        .add_text("state", "N")
        .add_text("contact", "123")
        .add_text("email_id", "nope")
        .add_part(
            "image",
            Part::bytes(vec![1, 2, 3])
                .file_name("school.jpg")
                .mime_type("image/jpeg"),
        );

    let response = ctx.server.post("/api/schools").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"].as_array().unwrap().len(), 6);

    // Validation rejected the request before any upload happened, and the
    // staged file was still cleaned up.
    assert_eq!(ctx.media.upload_count.load(Ordering::SeqCst), 0);
    assert_eq!(staged_file_count(ctx.upload_dir.path()), 0);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let ctx = test_context().await;

    let first = ctx
        .server
        .post("/api/schools")
        .multipart(school_form("a@b.com"))
        .await;
    assert_eq!(first.status_code(), 201);

    // Same email, differently cased: normalization makes it a duplicate.
    let second = ctx
        .server
        .post("/api/schools")
        .multipart(school_form("A@B.COM"))
        .await;
    assert_eq!(second.status_code(), 400);
    let body: Value = second.json();
    assert_eq!(body["success"], false);
    assert!(
        body["error"].as_str().unwrap().contains("already exists"),
        "got {body}"
    );
}

#[tokio::test]
async fn failed_upload_surfaces_error_and_cleans_temp_file() {
    let ctx = test_context().await;
    ctx.media.fail_next_uploads();

    let response = ctx
        .server
        .post("/api/schools")
        .multipart(school_form("a@b.com"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Failed to upload image"),
        "got {body}"
    );
    assert_eq!(staged_file_count(ctx.upload_dir.path()), 0);
}

#[tokio::test]
async fn rejected_image_content_type_is_a_bad_request() {
    let ctx = test_context().await;

    let form = scalar_form("a@b.com").add_part(
        "image",
        Part::bytes(b"%PDF-1.4".to_vec())
            .file_name("not-an-image.pdf")
            .mime_type("application/pdf"),
    );
    let response = ctx.server.post("/api/schools").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Only image files are allowed");
}

#[tokio::test]
async fn list_paginates_newest_first() {
    let ctx = test_context().await;
    for n in 1..=15 {
        seed_school(&ctx, n, "Springfield", "IL").await;
    }

    let response = ctx
        .server
        .get("/api/schools")
        .add_query_param("page", 2)
        .add_query_param("limit", 10)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data[4]["name"], "School 1");

    let pagination = &body["pagination"];
    assert_eq!(pagination["page"], 2);
    assert_eq!(pagination["limit"], 10);
    assert_eq!(pagination["total"], 15);
    assert_eq!(pagination["totalPages"], 2);
}

#[tokio::test]
async fn empty_listing_reports_a_single_page() {
    let ctx = test_context().await;

    let response = ctx.server.get("/api/schools").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["totalPages"], 1);
}

#[tokio::test]
async fn out_of_range_page_and_limit_clamp_to_defaults() {
    let ctx = test_context().await;
    for n in 1..=3 {
        seed_school(&ctx, n, "Springfield", "IL").await;
    }

    let response = ctx
        .server
        .get("/api/schools")
        .add_query_param("page", 0)
        .add_query_param("limit", -5)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn huge_page_number_returns_an_empty_page() {
    let ctx = test_context().await;
    seed_school(&ctx, 1, "Metropolis", "NY").await;

    let response = ctx
        .server
        .get("/api/schools")
        .add_query_param("page", i64::MAX)
        .add_query_param("limit", 100)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn search_is_case_insensitive_across_name_city_state() {
    let ctx = test_context().await;
    seed_school(&ctx, 1, "Metropolis", "NY").await;
    seed_school(&ctx, 2, "Gotham", "NJ").await;
    seed_school(&ctx, 3, "Smallville", "KS").await;

    let response = ctx
        .server
        .get("/api/schools")
        .add_query_param("search", "METROpol")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["city"], "Metropolis");
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn get_returns_record_or_not_found() {
    let ctx = test_context().await;
    seed_school(&ctx, 1, "Metropolis", "NY").await;

    let listing: Value = ctx.server.get("/api/schools").await.json();
    let id = listing["data"][0]["id"].as_i64().unwrap();

    let response = ctx.server.get(&format!("/api/schools/{id}")).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "School 1");

    let missing = ctx.server.get("/api/schools/424242").await;
    assert_eq!(missing.status_code(), 404);
    let body: Value = missing.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_without_new_image_keeps_the_previous_url() {
    let ctx = test_context().await;

    let created: Value = ctx
        .server
        .post("/api/schools")
        .multipart(school_form("a@b.com"))
        .await
        .json();
    let id = created["data"]["id"].as_i64().unwrap();
    let original_image = created["data"]["image"].as_str().unwrap().to_string();

    let response = ctx
        .server
        .put(&format!("/api/schools/{id}"))
        .multipart(scalar_form("a@b.com"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["image"], original_image.as_str());
}

#[tokio::test]
async fn update_with_failing_upload_keeps_previous_url_silently() {
    let ctx = test_context().await;

    let created: Value = ctx
        .server
        .post("/api/schools")
        .multipart(school_form("a@b.com"))
        .await
        .json();
    let id = created["data"]["id"].as_i64().unwrap();
    let original_image = created["data"]["image"].as_str().unwrap().to_string();

    ctx.media.fail_next_uploads();
    let response = ctx
        .server
        .put(&format!("/api/schools/{id}"))
        .multipart(school_form("a@b.com"))
        .await;

    // The failed replacement upload is not surfaced; the record keeps its
    // previous image.
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["image"], original_image.as_str());
    assert_eq!(staged_file_count(ctx.upload_dir.path()), 0);
}

#[tokio::test]
async fn update_missing_record_is_not_found_and_cleans_temp_file() {
    let ctx = test_context().await;

    let response = ctx
        .server
        .put("/api/schools/424242")
        .multipart(school_form("a@b.com"))
        .await;

    assert_eq!(response.status_code(), 404);
    assert_eq!(staged_file_count(ctx.upload_dir.path()), 0);
    // The pipeline bails before the upload step.
    assert_eq!(ctx.media.upload_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn delete_removes_record_and_missing_id_is_not_found() {
    let ctx = test_context().await;
    seed_school(&ctx, 1, "Metropolis", "NY").await;

    let listing: Value = ctx.server.get("/api/schools").await.json();
    let id = listing["data"][0]["id"].as_i64().unwrap();

    let response = ctx.server.delete(&format!("/api/schools/{id}")).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["message"], "School deleted successfully");

    let again = ctx.server.delete(&format!("/api/schools/{id}")).await;
    assert_eq!(again.status_code(), 404);

    let listing: Value = ctx.server.get("/api/schools").await.json();
    assert_eq!(listing["pagination"]["total"], 0);
}

#[tokio::test]
async fn health_endpoint_reports_database_status() {
    let ctx = test_context().await;

    let response = ctx.server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], "connected");
}
