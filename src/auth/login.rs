//! Owner login.

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::password::PasswordScheme;
use crate::db::{Owner, OwnerRepository};
use crate::{FilehubError, Result};

/// Check an email/password pair and return the matching owner.
///
/// An unknown email and a wrong password both yield `InvalidCredentials`.
pub async fn login(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    scheme: &dyn PasswordScheme,
) -> Result<Owner> {
    let owner = OwnerRepository::new(pool).get_by_email(email.trim()).await?;

    match owner {
        Some(owner) if scheme.verify(password, &owner.password) => {
            info!(owner_id = owner.id, "Owner logged in");
            Ok(owner)
        }
        _ => {
            warn!(email = %email, "Failed login attempt");
            Err(FilehubError::InvalidCredentials)
        }
    }
}
