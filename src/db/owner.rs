//! Owner model for filehub.
//!
//! Owners are the users that upload and manage files.

/// A registered owner.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Owner {
    /// 8-digit owner id.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login key. Not unique at the schema level.
    pub email: String,
    /// Stored password, as produced by the configured password scheme.
    pub password: String,
    /// Free-form gender field.
    pub gender: String,
}

impl Owner {
    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Data for creating a new owner.
#[derive(Debug, Clone)]
pub struct NewOwner {
    /// Requested id. A fresh one is allocated when `None`.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Password as produced by the password scheme.
    pub password: String,
    pub gender: String,
}

impl NewOwner {
    /// Create a new owner with the required fields.
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

    /// Request a specific id instead of an allocated one.
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

/// Partial update of an owner. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct OwnerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// New stored password (already hashed by the scheme).
    pub password: Option<String>,
    pub gender: Option<String>,
}

impl OwnerUpdate {
    /// Create an empty update.
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

    /// Set the stored password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the gender.
    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Check if the update is empty (no fields to update).
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.gender.is_none()
    }
}
