//! Response DTOs for Web API.

use serde::Serialize;

use crate::db::Owner;
use crate::file::FileRecord;

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Plain message payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// File DTOs
// ============================================================================

/// File record as returned by the API.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub storage_locator: String,
    pub public_url: String,
    /// RFC 3339 upload timestamp.
    pub created_at: String,
    pub owner_id: i64,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            storage_locator: record.storage_locator,
            public_url: record.public_url,
            created_at: record.created_at.to_rfc3339(),
            owner_id: record.owner_id,
        }
    }
}

// ============================================================================
// Owner DTOs
// ============================================================================

/// Owner as returned by the API. The stored password is never exposed.
#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
}

impl From<Owner> for OwnerResponse {
    fn from(owner: Owner) -> Self {
        Self {
            id: owner.id,
            first_name: owner.first_name,
            last_name: owner.last_name,
            email: owner.email,
            gender: owner.gender,
        }
    }
}

/// Result of registration and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: i64,
    pub email: String,
}

impl From<&Owner> for AuthResponse {
    fn from(owner: &Owner) -> Self {
        Self {
            user_id: owner.id,
            email: owner.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn owner() -> Owner {
        Owner {
            id: 12_345_678,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            password: "secret".to_string(),
            gender: String::new(),
        }
    }

    #[test]
    fn test_owner_response_hides_password() {
        let json = serde_json::to_value(OwnerResponse::from(owner())).unwrap();
        assert_eq!(json["id"], 12_345_678);
        assert_eq!(json["email"], "ann@example.com");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_auth_response() {
        let json = serde_json::to_value(ApiResponse::new(AuthResponse::from(&owner()))).unwrap();
        assert_eq!(json["data"]["user_id"], 12_345_678);
        assert_eq!(json["data"]["email"], "ann@example.com");
    }

    #[test]
    fn test_file_response_timestamp() {
        let record = FileRecord {
            id: 87_654_321,
            title: "Report".to_string(),
            description: String::new(),
            storage_locator: "abc_report.pdf".to_string(),
            public_url: "http://localhost:8080/uploads/abc_report.pdf".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            owner_id: 12_345_678,
        };
        let response = FileResponse::from(record);
        assert_eq!(response.created_at, "2024-05-01T12:00:00+00:00");
        assert_eq!(response.owner_id, 12_345_678);
    }
}
