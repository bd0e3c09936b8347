//! filehub - a small file-hosting service.
//!
//! Owners register, upload files under unique storage locators, and manage
//! the catalog entries (title, description) of their own files. Files can be
//! listed, searched, downloaded raw or zipped, and viewed by locator.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod id;
pub mod logging;
pub mod web;

pub use auth::{
    login, register, scheme_from_name, update_profile, Argon2Scheme, PasswordScheme,
    PlaintextScheme, ProfileUpdateRequest, RegistrationRequest, ValidationError,
};
pub use config::Config;
pub use db::{Database, NewOwner, Owner, OwnerRepository, OwnerUpdate};
pub use error::{FilehubError, Result};
pub use file::{FileRecord, FileRepository, FileService, FileStore, UploadRequest};
pub use id::{generate_id, is_valid_id, IdAllocator, RandomIdAllocator};
