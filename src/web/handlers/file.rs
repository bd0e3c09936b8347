//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{FileRecord, UploadRequest};
use crate::web::dto::validation::sanitize_string;
use crate::web::dto::{
    ApiResponse, FileResponse, MessageResponse, SearchQuery, UpdateFileRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Generate a safe Content-Disposition header value.
///
/// Control characters are dropped, quotes and backslashes are replaced in the
/// plain `filename` parameter, and non-ASCII names get an RFC 5987
/// `filename*` parameter.
fn content_disposition_header(disposition: &str, filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("{}; filename=\"{}\"", disposition, filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition, sanitized, encoded
    )
}

/// Build a raw-bytes response with a guessed content type.
fn file_response(
    content: Vec<u8>,
    filename: &str,
    disposition: &str,
    content_type: Option<&str>,
) -> Result<Response<Body>, ApiError> {
    let content_type = content_type.map(str::to_string).unwrap_or_else(|| {
        mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string()
    });

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(disposition, filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Upload exceeds the configured size limit")
    } else {
        tracing::warn!("Failed to read multipart data: {}", e);
        ApiError::bad_request("Invalid multipart data")
    }
}

fn to_responses(records: Vec<FileRecord>) -> Vec<FileResponse> {
    records.into_iter().map(FileResponse::from).collect()
}

/// POST /files/upload/:owner_id - Upload a file for an owner.
///
/// Multipart fields: `file` (required), `title`, `description`. A missing
/// title falls back to the uploaded file name.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let mut filename: Option<String> = None;
    let mut title: Option<String> = None;
    let mut description = String::new();
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = Some(field.file_name().unwrap_or("file").to_string());
                content = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            "title" => {
                title = Some(sanitize_string(&field.text().await.map_err(multipart_error)?));
            }
            "description" => {
                description = sanitize_string(&field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (filename, content) = match (filename, content) {
        (Some(filename), Some(content)) => (filename, content),
        _ => return Err(ApiError::bad_request("No file provided")),
    };

    if content.len() as u64 > state.files.max_file_size() {
        let max_mb = state.files.max_file_size() / 1024 / 1024;
        return Err(ApiError::payload_too_large(format!(
            "File too large (max {}MB)",
            max_mb
        )));
    }

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| filename.clone());

    let request = UploadRequest::new(owner_id, title, filename, content)
        .with_description(description.trim());
    let record = state.files.upload(request).await?;

    Ok(Json(ApiResponse::new(FileResponse::from(record))))
}

/// GET /files/all - List every file.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let records = state.files.list_all().await?;
    Ok(Json(ApiResponse::new(to_responses(records))))
}

/// GET /files/user/:owner_id - List the files of one owner.
pub async fn list_owner_files(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let records = state.files.list_by_owner(owner_id).await?;
    Ok(Json(ApiResponse::new(to_responses(records))))
}

/// GET /files/:file_id - Get file metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let record = state.files.get(file_id).await?;
    Ok(Json(ApiResponse::new(FileResponse::from(record))))
}

/// PUT /files/update/:file_id/:owner_id - Update title and description.
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Path((file_id, owner_id)): Path<(i64, i64)>,
    ValidatedJson(req): ValidatedJson<UpdateFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let record = state
        .files
        .update(file_id, req.title.trim(), req.description.trim(), owner_id)
        .await?;
    Ok(Json(ApiResponse::new(FileResponse::from(record))))
}

/// DELETE /files/delete/:file_id/:owner_id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path((file_id, owner_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.files.delete(file_id, owner_id).await?;
    Ok(Json(ApiResponse::new(MessageResponse::new(
        "File deleted successfully!",
    ))))
}

/// GET /files/download/:file_id - Download the raw bytes.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let download = state.files.download(file_id).await?;
    file_response(download.content, &download.file_name, "attachment", None)
}

/// GET /files/download/:file_id/zip - Download the file packed in a zip archive.
pub async fn download_zip(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let archive = state.files.download_zip(file_id).await?;
    file_response(
        archive.bytes,
        &archive.file_name,
        "attachment",
        Some("application/zip"),
    )
}

/// GET /files/view/:file_name and GET /uploads/:file_name - Serve a stored
/// object inline by its locator.
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let view = state.files.view(&file_name).await?;
    file_response(view.content, &view.file_name, "inline", None)
}

/// GET /files/search?query= - Search by title or owner name.
pub async fn search_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let records = state.files.search(query.query.trim()).await?;
    Ok(Json(ApiResponse::new(to_responses(records))))
}
