//! Input validation for owner registration and profile updates.

use thiserror::Error;

use crate::FilehubError;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length of first and last name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email is missing.
    #[error("email cannot be empty")]
    EmailEmpty,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,

    /// Password is missing.
    #[error("password cannot be empty")]
    PasswordEmpty,

    /// First or last name is too long.
    #[error("names must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong,
}

impl From<ValidationError> for FilehubError {
    fn from(e: ValidationError) -> Self {
        FilehubError::Validation(e.to_string())
    }
}

/// Validate an email address.
///
/// Only the shape is checked: one `@` with text on both sides and no
/// whitespace.
///
/// # Examples
///
/// ```
/// use filehub::auth::validation::validate_email;
///
/// assert!(validate_email("ann@example.com").is_ok());
/// assert!(validate_email("ann@localhost").is_ok());
/// assert!(validate_email("").is_err());
/// assert!(validate_email("ann").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
        _ => return Err(ValidationError::EmailInvalidFormat),
    }

    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate a password. Any non-empty password is accepted.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }
    Ok(())
}

/// Validate a first or last name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Validate all registration fields at once.
///
/// Returns the first validation error encountered.
pub fn validate_registration(
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)?;
    validate_name(first_name)?;
    validate_name(last_name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("a@b").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailEmpty));
        assert_eq!(
            validate_email("no-at-sign"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_email("@example.com"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(validate_email("user@"), Err(ValidationError::EmailInvalidFormat));
        assert_eq!(
            validate_email("a@b@c"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_email("us er@example.com"),
            Err(ValidationError::EmailInvalidFormat)
        );
    }

    #[test]
    fn test_validate_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert_eq!(validate_email(&email), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn test_validate_password() {
        assert_eq!(validate_password(""), Err(ValidationError::PasswordEmpty));
        assert!(validate_password("x").is_ok());
    }

    #[test]
    fn test_validate_registration_first_error_wins() {
        assert_eq!(
            validate_registration("Ann", "Lee", "bad", ""),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert!(validate_registration("Ann", "Lee", "ann@example.com", "pw").is_ok());
        assert_eq!(
            validate_registration(&"x".repeat(MAX_NAME_LENGTH + 1), "", "a@b.c", "pw"),
            Err(ValidationError::NameTooLong)
        );
    }

    #[test]
    fn test_into_filehub_error() {
        let err: FilehubError = ValidationError::PasswordEmpty.into();
        assert!(matches!(err, FilehubError::Validation(msg) if msg.contains("password")));
    }
}
