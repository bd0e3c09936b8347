//! File management module for filehub.
//!
//! This module provides the upload/storage/retrieval pathway:
//! - Storage of uploaded bytes under unique locators
//! - The file catalog (records with title, description and owner)
//! - Owner-only update and delete
//! - Zip packaging and view-by-name with a traversal guard

mod guard;
mod lock;
mod record;
mod service;
mod storage;

pub use guard::{authorize, require_owner};
pub use lock::{RecordGuard, RecordLocks};
pub use record::{FileRecord, FileRepository, NewFileRecord};
pub use service::{DownloadResult, FileService, UploadRequest, ViewResult};
pub use storage::{original_name, sanitize_name, FileStore, ZipArchive};

/// Maximum length for the sanitized part of a locator (in characters).
pub const MAX_FILENAME_LENGTH: usize = 100;

/// Default maximum file size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
