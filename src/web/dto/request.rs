//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::auth::{ProfileUpdateRequest, RegistrationRequest};

/// Owner registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Requested id. Ignored unless it is a valid 8-digit id.
    #[serde(default)]
    pub id: Option<i64>,
    #[validate(
        length(max = 100, message = "First name must be at most 100 characters"),
        custom(function = "no_control_chars")
    )]
    pub first_name: String,
    #[validate(
        length(max = 100, message = "Last name must be at most 100 characters"),
        custom(function = "no_control_chars")
    )]
    pub last_name: String,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub gender: String,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(req: RegisterRequest) -> Self {
        let mut request = RegistrationRequest::new(
            req.first_name,
            req.last_name,
            req.email,
            req.password,
        )
        .with_gender(req.gender);
        if let Some(id) = req.id {
            request = request.with_id(id);
        }
        request
    }
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "not_empty_trimmed"))]
    pub email: String,
    pub password: String,
}

/// Partial owner update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOwnerRequest {
    #[validate(custom(function = "no_control_chars"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "no_control_chars"))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[validate(custom(function = "no_control_chars"))]
    pub gender: Option<String>,
}

impl From<UpdateOwnerRequest> for ProfileUpdateRequest {
    fn from(req: UpdateOwnerRequest) -> Self {
        ProfileUpdateRequest {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            gender: req.gender,
        }
    }
}

/// File metadata update.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFileRequest {
    #[validate(
        length(max = 200, message = "Title must be at most 200 characters"),
        custom(function = "no_control_chars")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(
        length(max = 5000, message = "Description must be at most 5000 characters"),
        custom(function = "no_control_chars")
    )]
    pub description: String,
}

/// `?query=` parameter shared by the search endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}
