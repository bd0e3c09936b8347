//! Test helpers for the HTTP API tests.
//!
//! Builds the full router over an in-memory database and a temporary
//! storage root.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use filehub::auth::PlaintextScheme;
use filehub::file::{FileService, FileStore};
use filehub::web::handlers::AppState;
use filehub::web::router::create_router;
use filehub::Database;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Upload limit used by the test router.
pub const TEST_MAX_UPLOAD: usize = 1024 * 1024;

/// Router under test plus the handles needed to inspect its side effects.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub store: FileStore,
    /// Keeps the storage root alive for the duration of the test.
    _storage: TempDir,
}

/// Create a test server with an in-memory database and an empty storage root.
pub async fn create_test_app() -> TestApp {
    let storage = tempfile::tempdir().expect("Failed to create storage dir");

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let files = FileService::new(
        &db,
        FileStore::new(storage.path()),
        "http://localhost:8080",
    )
    .with_max_file_size(TEST_MAX_UPLOAD as u64);

    let app_state = Arc::new(AppState::new(db.clone(), files, Arc::new(PlaintextScheme)));
    let router = create_router(app_state, &[], TEST_MAX_UPLOAD);

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        store: FileStore::new(storage.path()),
        _storage: storage,
    }
}

/// Register an owner and return its id.
pub async fn register_owner(server: &TestServer, first: &str, last: &str, email: &str) -> i64 {
    let response = server
        .post("/users/register")
        .json(&json!({
            "first_name": first,
            "last_name": last,
            "email": email,
            "password": "secret"
        }))
        .await;

    response.assert_status_ok();
    response.json::<Value>()["data"]["user_id"]
        .as_i64()
        .expect("user_id missing from registration response")
}

/// Upload `content` as `file_name` for an owner and return the response body.
pub async fn upload(
    server: &TestServer,
    owner_id: i64,
    title: &str,
    file_name: &str,
    content: &[u8],
) -> Value {
    let form = MultipartForm::new()
        .add_text("title", title)
        .add_text("description", format!("{title} description"))
        .add_part(
            "file",
            Part::bytes(content.to_vec())
                .file_name(file_name)
                .mime_type("application/octet-stream"),
        );

    let response = server
        .post(&format!("/files/upload/{owner_id}"))
        .multipart(form)
        .await;

    response.assert_status_ok();
    response.json::<Value>()
}

/// Extract the file id from an upload response.
pub fn file_id(upload_response: &Value) -> i64 {
    upload_response["data"]["id"]
        .as_i64()
        .expect("id missing from upload response")
}
