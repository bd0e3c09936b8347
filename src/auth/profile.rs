//! Owner profile updates.

use sqlx::SqlitePool;
use tracing::info;

use super::password::PasswordScheme;
use super::validation::{validate_email, validate_name, validate_password};
use crate::db::{Owner, OwnerRepository, OwnerUpdate};
use crate::{FilehubError, Result};

/// Profile update request. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// New plain password; stored through the password scheme.
    pub password: Option<String>,
    pub gender: Option<String>,
}

impl ProfileUpdateRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first name.
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Set the last name.
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Set the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the gender.
    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }
}

/// Apply a partial update to an owner.
///
/// Fails with `NotFound` for an unknown owner and with `Conflict` when the
/// new email belongs to another owner.
pub async fn update_profile(
    pool: &SqlitePool,
    owner_id: i64,
    request: ProfileUpdateRequest,
    scheme: &dyn PasswordScheme,
) -> Result<Owner> {
    let repo = OwnerRepository::new(pool);
    let current = repo
        .get_by_id(owner_id)
        .await?
        .ok_or_else(|| FilehubError::NotFound(format!("owner {owner_id}")))?;

    let mut update = OwnerUpdate::new();

    if let Some(first_name) = request.first_name {
        let first_name = first_name.trim();
        validate_name(first_name)?;
        update = update.first_name(first_name);
    }

    if let Some(last_name) = request.last_name {
        let last_name = last_name.trim();
        validate_name(last_name)?;
        update = update.last_name(last_name);
    }

    if let Some(email) = request.email {
        let email = email.trim();
        validate_email(email)?;
        if email != current.email {
            if let Some(other) = repo.get_by_email(email).await? {
                if other.id != owner_id {
                    return Err(FilehubError::Conflict(format!(
                        "email {email} is already registered"
                    )));
                }
            }
        }
        update = update.email(email);
    }

    if let Some(password) = request.password {
        validate_password(&password)?;
        update = update.password(scheme.hash(&password)?);
    }

    if let Some(gender) = request.gender {
        update = update.gender(gender.trim());
    }

    let updated = repo
        .update(owner_id, &update)
        .await?
        .ok_or_else(|| FilehubError::NotFound(format!("owner {owner_id}")))?;

    info!(owner_id, "Profile updated");

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{register, Argon2Scheme, PlaintextScheme, RegistrationRequest};
    use crate::Database;

    async fn setup() -> (Database, Owner) {
        let db = Database::open_in_memory().await.unwrap();
        let owner = register(
            db.pool(),
            RegistrationRequest::new("Ann", "Lee", "ann@example.com", "secret"),
            &PlaintextScheme,
        )
        .await
        .unwrap();
        (db, owner)
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (db, owner) = setup().await;

        let updated = update_profile(
            db.pool(),
            owner.id,
            ProfileUpdateRequest::new().last_name(" Smith ").gender("f"),
            &PlaintextScheme,
        )
        .await
        .unwrap();

        assert_eq!(updated.first_name, "Ann");
        assert_eq!(updated.last_name, "Smith");
        assert_eq!(updated.gender, "f");
        assert_eq!(updated.password, "secret");
    }

    #[tokio::test]
    async fn test_empty_update_returns_current() {
        let (db, owner) = setup().await;
        let same = update_profile(db.pool(), owner.id, ProfileUpdateRequest::new(), &PlaintextScheme)
            .await
            .unwrap();
        assert_eq!(same, owner);
    }

    #[tokio::test]
    async fn test_password_is_rehashed() {
        let (db, owner) = setup().await;
        let scheme = Argon2Scheme::with_params(8 * 1024, 1, 1);

        let updated = update_profile(
            db.pool(),
            owner.id,
            ProfileUpdateRequest::new().password("new-secret"),
            &scheme,
        )
        .await
        .unwrap();

        assert!(updated.password.starts_with("$argon2id$"));
        assert!(scheme.verify("new-secret", &updated.password));
    }

    #[tokio::test]
    async fn test_missing_owner() {
        let (db, _) = setup().await;
        let err = update_profile(
            db.pool(),
            99_999_999,
            ProfileUpdateRequest::new().first_name("X"),
            &PlaintextScheme,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FilehubError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_email_taken_by_other_owner() {
        let (db, owner) = setup().await;
        register(
            db.pool(),
            RegistrationRequest::new("Bob", "Ray", "bob@example.com", "pw"),
            &PlaintextScheme,
        )
        .await
        .unwrap();

        let err = update_profile(
            db.pool(),
            owner.id,
            ProfileUpdateRequest::new().email("bob@example.com"),
            &PlaintextScheme,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FilehubError::Conflict(_)));

        let same_email = update_profile(
            db.pool(),
            owner.id,
            ProfileUpdateRequest::new().email("ann@example.com"),
            &PlaintextScheme,
        )
        .await;
        assert!(same_email.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_fields() {
        let (db, owner) = setup().await;
        for request in [
            ProfileUpdateRequest::new().email("broken"),
            ProfileUpdateRequest::new().password(""),
        ] {
            let err = update_profile(db.pool(), owner.id, request, &PlaintextScheme)
                .await
                .unwrap_err();
            assert!(matches!(err, FilehubError::Validation(_)));
        }
    }
}
