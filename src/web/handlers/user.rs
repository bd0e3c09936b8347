//! Owner handlers for Web API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::auth::{login, register, update_profile};
use crate::db::{Owner, OwnerRepository};
use crate::web::dto::{
    ApiResponse, AuthResponse, LoginRequest, OwnerResponse, RegisterRequest, SearchQuery,
    UpdateOwnerRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

fn to_responses(owners: Vec<Owner>) -> Vec<OwnerResponse> {
    owners.into_iter().map(OwnerResponse::from).collect()
}

/// POST /users/register - Register a new owner.
pub async fn register_owner(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let owner = register(state.db.pool(), req.into(), state.scheme.as_ref()).await?;
    Ok(Json(ApiResponse::new(AuthResponse::from(&owner))))
}

/// POST /users/login - Check an email/password pair.
pub async fn login_owner(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let owner = login(
        state.db.pool(),
        &req.email,
        &req.password,
        state.scheme.as_ref(),
    )
    .await?;
    Ok(Json(ApiResponse::new(AuthResponse::from(&owner))))
}

/// GET /users - List all owners.
pub async fn list_owners(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<OwnerResponse>>>, ApiError> {
    let owners = OwnerRepository::new(state.db.pool()).list_all().await?;
    Ok(Json(ApiResponse::new(to_responses(owners))))
}

/// GET /users/:id - Get an owner.
pub async fn get_owner(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<i64>,
) -> Result<Json<ApiResponse<OwnerResponse>>, ApiError> {
    let owner = OwnerRepository::new(state.db.pool())
        .get_by_id(owner_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(ApiResponse::new(OwnerResponse::from(owner))))
}

/// GET /users/email/:email - Get an owner by email.
pub async fn get_owner_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<OwnerResponse>>, ApiError> {
    let owner = OwnerRepository::new(state.db.pool())
        .get_by_email(email.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(ApiResponse::new(OwnerResponse::from(owner))))
}

/// PUT /users/:id - Partially update an owner.
pub async fn update_owner(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateOwnerRequest>,
) -> Result<Json<ApiResponse<OwnerResponse>>, ApiError> {
    let owner = update_profile(
        state.db.pool(),
        owner_id,
        req.into(),
        state.scheme.as_ref(),
    )
    .await?;
    Ok(Json(ApiResponse::new(OwnerResponse::from(owner))))
}

/// GET /users/search?query= - Search owners by name or email.
pub async fn search_owners(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<OwnerResponse>>>, ApiError> {
    let owners = OwnerRepository::new(state.db.pool())
        .search(query.query.trim())
        .await?;
    Ok(Json(ApiResponse::new(to_responses(owners))))
}
