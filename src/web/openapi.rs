//! OpenAPI documentation generation using utoipa
//!
//! Handler functions carry `#[utoipa::path]` annotations; this module
//! collects them into the specification served alongside Swagger UI.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Registry API",
        version = "0.1.0",
        description = "School record management: CRUD over school records with \
image uploads forwarded to an external media host, paginated listing, and \
case-insensitive search.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::web::handlers::schools::create_school,
        crate::web::handlers::schools::list_schools,
        crate::web::handlers::schools::get_school,
        crate::web::handlers::schools::update_school,
        crate::web::handlers::schools::delete_school,
        crate::web::handlers::health::health_check,
    ),
    components(schemas(
        crate::models::School,
        crate::models::SchoolInput,
        crate::errors::FieldViolation,
        crate::web::responses::Pagination,
        crate::web::handlers::schools::DeleteResponse,
        crate::web::handlers::health::HealthResponse,
    )),
    tags(
        (name = "schools", description = "School record management"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
