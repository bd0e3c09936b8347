//! HTTP API for filehub.
//!
//! Routes live under `/files` and `/users`; stored objects are also served
//! at `/uploads/:file_name`, the path every public URL points at.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
