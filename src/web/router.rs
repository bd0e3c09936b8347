//! API router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download_file, download_zip, get_file, get_owner, get_owner_by_email,
    health_check, home, list_files, list_owner_files, list_owners, login_owner, register_owner,
    search_files, search_owners, update_file, update_owner, upload_file, view_file, AppState,
};
use super::middleware::{create_cors_layer, security_headers};

/// Extra room for multipart framing and the text fields around the file part.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main router.
///
/// `max_upload_bytes` caps request bodies; uploads above it are rejected
/// with 413.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    max_upload_bytes: usize,
) -> Router {
    let file_routes = Router::new()
        .route("/upload/:owner_id", post(upload_file))
        .route("/all", get(list_files))
        .route("/search", get(search_files))
        .route("/user/:owner_id", get(list_owner_files))
        .route("/update/:file_id/:owner_id", put(update_file))
        .route("/delete/:file_id/:owner_id", delete(delete_file))
        .route("/download/:file_id", get(download_file))
        .route("/download/:file_id/zip", get(download_zip))
        .route("/view/:file_name", get(view_file))
        .route("/:file_id", get(get_file));

    let user_routes = Router::new()
        .route("/", get(list_owners))
        .route("/register", post(register_owner))
        .route("/login", post(login_owner))
        .route("/search", get(search_owners))
        .route("/email/:email", get(get_owner_by_email))
        .route("/:id", get(get_owner).put(update_owner));

    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/uploads/:file_name", get(view_file))
        .nest("/files", file_routes)
        .nest("/users", user_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(DefaultBodyLimit::max(
                    max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
                )),
        )
        .with_state(app_state)
}
