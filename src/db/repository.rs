//! Owner repository for filehub.
//!
//! This module provides CRUD and search operations for owners.

use sqlx::{QueryBuilder, SqlitePool};
use tracing::debug;

use super::{contains_folded, is_id_collision};
use super::owner::{NewOwner, Owner, OwnerUpdate};
use crate::id::{IdAllocator, RandomIdAllocator, MAX_ID_ATTEMPTS};
use crate::{FilehubError, Result};

static RANDOM_IDS: RandomIdAllocator = RandomIdAllocator;

const OWNER_COLUMNS: &str = "id, first_name, last_name, email, password, gender";

/// Repository for owner CRUD operations.
pub struct OwnerRepository<'a> {
    pool: &'a SqlitePool,
    ids: &'a dyn IdAllocator,
}

impl<'a> OwnerRepository<'a> {
    /// Create a new OwnerRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            ids: &RANDOM_IDS,
        }
    }

    /// Use a different id source for new owners.
    pub fn with_id_allocator(mut self, ids: &'a dyn IdAllocator) -> Self {
        self.ids = ids;
        self
    }

    /// Create a new owner.
    ///
    /// A requested id is used as-is and a collision on it is a `Conflict`.
    /// Otherwise ids are drawn from the allocator until one is free.
    pub async fn create(&self, new_owner: &NewOwner) -> Result<Owner> {
        if let Some(id) = new_owner.id {
            return match self.insert(id, new_owner).await {
                Ok(()) => self.fetch_created(id).await,
                Err(e) if is_id_collision(&e, "users") => Err(FilehubError::Conflict(format!(
                    "owner id {id} is already taken"
                ))),
                Err(e) => Err(e.into()),
            };
        }

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            match self.insert(id, new_owner).await {
                Ok(()) => return self.fetch_created(id).await,
                Err(e) if is_id_collision(&e, "users") => {
                    debug!(id, attempt, "owner id collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(FilehubError::IdExhausted(MAX_ID_ATTEMPTS))
    }

    async fn insert(&self, id: i64, new_owner: &NewOwner) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password, gender)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&new_owner.first_name)
        .bind(&new_owner.last_name)
        .bind(&new_owner.email)
        .bind(&new_owner.password)
        .bind(&new_owner.gender)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_created(&self, id: i64) -> Result<Owner> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| FilehubError::NotFound(format!("owner {id}")))
    }

    /// Get an owner by id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Owner>> {
        let result = sqlx::query_as::<_, Owner>(&format!(
            "SELECT {OWNER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FilehubError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get an owner by exact email.
    ///
    /// Email is not unique in the schema; the oldest matching row wins.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Owner>> {
        let result = sqlx::query_as::<_, Owner>(&format!(
            "SELECT {OWNER_COLUMNS} FROM users WHERE email = ? ORDER BY rowid LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FilehubError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Check if an email is already registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(self.pool)
            .await
            .map_err(|e| FilehubError::Database(e.to_string()))?;
        Ok(exists.0)
    }

    /// Update an owner by id.
    ///
    /// Only fields that are set in the update are modified.
    /// Returns the updated owner, or None if not found.
    pub async fn update(&self, id: i64, update: &OwnerUpdate) -> Result<Option<Owner>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref first_name) = update.first_name {
            separated.push("first_name = ");
            separated.push_bind_unseparated(first_name);
        }
        if let Some(ref last_name) = update.last_name {
            separated.push("last_name = ");
            separated.push_bind_unseparated(last_name);
        }
        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }
        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }
        if let Some(ref gender) = update.gender {
            separated.push("gender = ");
            separated.push_bind_unseparated(gender);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| FilehubError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// List all owners.
    pub async fn list_all(&self) -> Result<Vec<Owner>> {
        let owners = sqlx::query_as::<_, Owner>(&format!(
            "SELECT {OWNER_COLUMNS} FROM users ORDER BY last_name, first_name, id"
        ))
        .fetch_all(self.pool)
        .await
        .map_err(|e| FilehubError::Database(e.to_string()))?;

        Ok(owners)
    }

    /// Search owners whose first name, last name or email contains `query`.
    ///
    /// Matching ignores case, including non-ASCII letters. An empty query
    /// matches every owner.
    pub async fn search(&self, query: &str) -> Result<Vec<Owner>> {
        let needle = query.to_lowercase();
        let owners = self
            .list_all()
            .await?
            .into_iter()
            .filter(|owner| {
                contains_folded(&owner.first_name, &needle)
                    || contains_folded(&owner.last_name, &needle)
                    || contains_folded(&owner.email, &needle)
            })
            .collect();

        Ok(owners)
    }

    /// Count all owners.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| FilehubError::Database(e.to_string()))?;
        Ok(count.0)
    }
}
