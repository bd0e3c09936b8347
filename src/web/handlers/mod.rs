//! API handlers for the file and owner routes.

pub mod file;
pub mod user;

use std::sync::Arc;

use crate::auth::PasswordScheme;
use crate::file::FileService;
use crate::Database;

pub use file::*;
pub use user::*;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// File catalog and storage.
    pub files: FileService,
    /// Scheme used to store and check owner passwords.
    pub scheme: Arc<dyn PasswordScheme>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, files: FileService, scheme: Arc<dyn PasswordScheme>) -> Self {
        Self { db, files, scheme }
    }
}

/// GET / - Greeting.
pub async fn home() -> &'static str {
    "Welcome to filehub"
}

/// GET /health - Liveness check.
pub async fn health_check() -> &'static str {
    "OK"
}
