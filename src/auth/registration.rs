//! Owner registration.

use sqlx::SqlitePool;
use tracing::info;

use super::password::PasswordScheme;
use super::validation::validate_registration;
use crate::db::{NewOwner, Owner, OwnerRepository};
use crate::id::is_valid_id;
use crate::{FilehubError, Result};

/// Registration request data.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    /// Requested id. Used only when it is a valid 8-digit id.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub gender: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
            gender: String::new(),
        }
    }

    /// Ask for a specific id.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the gender field.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }
}

/// Register a new owner.
///
/// This function:
/// 1. Trims and validates the input
/// 2. Rejects an email that is already registered with `Conflict`
/// 3. Stores the password through `scheme`
/// 4. Creates the owner, keeping a valid requested id and allocating one
///    otherwise
pub async fn register(
    pool: &SqlitePool,
    request: RegistrationRequest,
    scheme: &dyn PasswordScheme,
) -> Result<Owner> {
    let first_name = request.first_name.trim();
    let last_name = request.last_name.trim();
    let email = request.email.trim();

    validate_registration(first_name, last_name, email, &request.password)?;

    let repo = OwnerRepository::new(pool);
    if repo.email_exists(email).await? {
        return Err(FilehubError::Conflict(format!(
            "email {email} is already registered"
        )));
    }

    let stored_password = scheme.hash(&request.password)?;

    let mut new_owner = NewOwner::new(first_name, last_name, email, stored_password)
        .with_gender(request.gender.trim());
    if is_valid_id(request.id) {
        if let Some(id) = request.id {
            new_owner = new_owner.with_id(id);
        }
    }

    let owner = repo.create(&new_owner).await?;

    info!(
        owner_id = owner.id,
        name = %owner.full_name(),
        email = %owner.email,
        "New owner registered"
    );

    Ok(owner)
}
