//! File record types and repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::{contains_folded, is_id_collision};
use crate::id::{IdAllocator, RandomIdAllocator, MAX_ID_ATTEMPTS};
use crate::{FilehubError, Result};

static RANDOM_IDS: RandomIdAllocator = RandomIdAllocator;

const FILE_COLUMNS: &str =
    "files.id, files.title, files.description, files.storage_locator, files.public_url, \
     files.created_at, files.owner_id";

/// Catalog entry for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// 8-digit file id.
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Name of the backing object in the file store.
    pub storage_locator: String,
    /// URL computed at upload time from the configured base URL.
    pub public_url: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
}

/// A record joined with its owner's names, for search.
#[derive(sqlx::FromRow)]
struct SearchRow {
    #[sqlx(flatten)]
    record: FileRecord,
    first_name: String,
    last_name: String,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub storage_locator: String,
    pub public_url: String,
}

impl NewFileRecord {
    /// Create a new record description.
    pub fn new(
        owner_id: i64,
        title: impl Into<String>,
        storage_locator: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            owner_id,
            title: title.into(),
            description: String::new(),
            storage_locator: storage_locator.into(),
            public_url: public_url.into(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Repository for file record operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
    ids: &'a dyn IdAllocator,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            ids: &RANDOM_IDS,
        }
    }

    /// Use a different id source for new records.
    pub fn with_id_allocator(mut self, ids: &'a dyn IdAllocator) -> Self {
        self.ids = ids;
        self
    }

    /// Create a file record with a freshly allocated id.
    ///
    /// Fails with `OwnerNotFound` if the owner does not exist.
    pub async fn create(&self, new_file: &NewFileRecord) -> Result<FileRecord> {
        let owner_exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(new_file.owner_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| FilehubError::Database(e.to_string()))?;
        if !owner_exists.0 {
            return Err(FilehubError::OwnerNotFound(new_file.owner_id));
        }

        let created_at = Utc::now();
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            let result = sqlx::query(
                "INSERT INTO files (id, title, description, storage_locator, public_url, created_at, owner_id)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&new_file.title)
            .bind(&new_file.description)
            .bind(&new_file.storage_locator)
            .bind(&new_file.public_url)
            .bind(created_at)
            .bind(new_file.owner_id)
            .execute(self.pool)
            .await;

            match result {
                Ok(_) => {
                    return self
                        .get_by_id(id)
                        .await?
                        .ok_or_else(|| FilehubError::NotFound(format!("file {id}")));
                }
                Err(e) if is_id_collision(&e, "files") => {
                    debug!(id, attempt, "file id collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(FilehubError::IdExhausted(MAX_ID_ATTEMPTS))
    }

    /// Get a file record by id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE files.id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FilehubError::Database(e.to_string()))?;

        Ok(record)
    }

    /// List the records of one owner, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE files.owner_id = ?
             ORDER BY files.created_at DESC, files.id"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| FilehubError::Database(e.to_string()))?;

        Ok(records)
    }

    /// List every record, newest first.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY files.created_at DESC, files.id"
        ))
        .fetch_all(self.pool)
        .await
        .map_err(|e| FilehubError::Database(e.to_string()))?;

        Ok(records)
    }

    /// Search records by title or by the owner's first or last name.
    ///
    /// Substring match ignoring case, including non-ASCII letters; an empty
    /// query matches everything.
    pub async fn search(&self, query: &str) -> Result<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, SearchRow>(&format!(
            "SELECT {FILE_COLUMNS}, users.first_name, users.last_name FROM files
             JOIN users ON users.id = files.owner_id
             ORDER BY files.created_at DESC, files.id"
        ))
        .fetch_all(self.pool)
        .await
        .map_err(|e| FilehubError::Database(e.to_string()))?;

        let needle = query.to_lowercase();
        let records = rows
            .into_iter()
            .filter(|row| {
                contains_folded(&row.record.title, &needle)
                    || contains_folded(&row.first_name, &needle)
                    || contains_folded(&row.last_name, &needle)
            })
            .map(|row| row.record)
            .collect();

        Ok(records)
    }

    /// Overwrite title and description of a record.
    ///
    /// Returns the updated record, or None if not found.
    pub async fn update_details(
        &self,
        id: i64,
        title: &str,
        description: &str,
    ) -> Result<Option<FileRecord>> {
        let result = sqlx::query("UPDATE files SET title = ?, description = ? WHERE id = ?")
            .bind(title)
            .bind(description)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| FilehubError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a record by id.
    ///
    /// Returns true if a record was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| FilehubError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewOwner, OwnerRepository};
    use crate::id::{is_valid_id, testing::ScriptedIds};
    use crate::Database;

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let owners = OwnerRepository::new(db.pool());
        let ann = owners
            .create(&NewOwner::new("Ann", "Lee", "ann@example.com", "pw"))
            .await
            .unwrap();
        let bob = owners
            .create(&NewOwner::new("Bob", "Ray", "bob@example.com", "pw"))
            .await
            .unwrap();
        (db, ann.id, bob.id)
    }

    fn new_file(owner_id: i64, title: &str, locator: &str) -> NewFileRecord {
        NewFileRecord::new(
            owner_id,
            title,
            locator,
            format!("http://localhost:8080/uploads/{locator}"),
        )
    }

    #[tokio::test]
    async fn test_create_record() {
        let (db, ann, _) = setup().await;
        let repo = FileRepository::new(db.pool());

        let before = Utc::now();
        let record = repo
            .create(&new_file(ann, "Report", "loc-1").with_description("Q3"))
            .await
            .unwrap();

        assert!(is_valid_id(Some(record.id)));
        assert_eq!(record.title, "Report");
        assert_eq!(record.description, "Q3");
        assert_eq!(record.storage_locator, "loc-1");
        assert_eq!(record.owner_id, ann);
        assert!(record.created_at >= before - chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_create_owner_not_found() {
        let (db, _, _) = setup().await;
        let repo = FileRepository::new(db.pool());

        let err = repo
            .create(&new_file(12_121_212, "Orphan", "loc-x"))
            .await
            .unwrap_err();
        assert!(matches!(err, FilehubError::OwnerNotFound(12_121_212)));
    }

    #[tokio::test]
    async fn test_create_retries_on_id_collision() {
        let (db, ann, _) = setup().await;
        let ids = ScriptedIds::new(&[44_444_444, 44_444_444, 55_555_555]);
        let repo = FileRepository::new(db.pool()).with_id_allocator(&ids);

        let first = repo.create(&new_file(ann, "A", "loc-a")).await.unwrap();
        let second = repo.create(&new_file(ann, "B", "loc-b")).await.unwrap();

        assert_eq!(first.id, 44_444_444);
        assert_eq!(second.id, 55_555_555);
    }

    #[tokio::test]
    async fn test_duplicate_locator_is_not_an_id_collision() {
        let (db, ann, _) = setup().await;
        let repo = FileRepository::new(db.pool());

        repo.create(&new_file(ann, "A", "same")).await.unwrap();
        let err = repo.create(&new_file(ann, "B", "same")).await.unwrap_err();
        assert!(matches!(err, FilehubError::Database(_)));
    }

    #[tokio::test]
    async fn test_list_by_owner_and_all() {
        let (db, ann, bob) = setup().await;
        let repo = FileRepository::new(db.pool());
        repo.create(&new_file(ann, "A1", "a1")).await.unwrap();
        repo.create(&new_file(ann, "A2", "a2")).await.unwrap();
        repo.create(&new_file(bob, "B1", "b1")).await.unwrap();

        assert_eq!(repo.list_by_owner(ann).await.unwrap().len(), 2);
        assert_eq!(repo.list_by_owner(bob).await.unwrap().len(), 1);
        assert!(repo.list_by_owner(99_999_999).await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_title_and_owner_names() {
        let (db, ann, bob) = setup().await;
        let repo = FileRepository::new(db.pool());
        repo.create(&new_file(ann, "Quarterly Report", "r1")).await.unwrap();
        repo.create(&new_file(bob, "Holiday photos", "p1")).await.unwrap();

        let by_title = repo.search("REPORT").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Quarterly Report");

        let by_first_name = repo.search("ann").await.unwrap();
        assert_eq!(by_first_name.len(), 1);
        assert_eq!(by_first_name[0].owner_id, ann);

        let by_last_name = repo.search("ra").await.unwrap();
        assert_eq!(by_last_name.len(), 1);
        assert_eq!(by_last_name[0].owner_id, bob);

        assert_eq!(repo.search("").await.unwrap().len(), 2);
        assert!(repo.search("nothing-matches").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = Database::open_in_memory().await.unwrap();
        let emile = OwnerRepository::new(db.pool())
            .create(&NewOwner::new("Émile", "Øster", "emile@example.com", "pw"))
            .await
            .unwrap();
        let repo = FileRepository::new(db.pool());
        let record = repo
            .create(&new_file(emile.id, "Ärger Bericht", "u1"))
            .await
            .unwrap();

        for query in ["ärger", "ÄRGER", "émile", "øster", "ØSTER"] {
            let found = repo.search(query).await.unwrap();
            let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
            assert_eq!(ids, vec![record.id], "query {query:?}");
        }
    }

    #[tokio::test]
    async fn test_update_details() {
        let (db, ann, _) = setup().await;
        let repo = FileRepository::new(db.pool());
        let record = repo.create(&new_file(ann, "Old", "u1")).await.unwrap();

        let updated = repo
            .update_details(record.id, "New", "desc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, "desc");
        assert_eq!(updated.storage_locator, record.storage_locator);
        assert_eq!(updated.created_at, record.created_at);

        assert!(repo
            .update_details(12_345_678, "x", "y")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_record() {
        let (db, ann, _) = setup().await;
        let repo = FileRepository::new(db.pool());
        let record = repo.create(&new_file(ann, "Gone", "d1")).await.unwrap();

        assert!(repo.delete(record.id).await.unwrap());
        assert!(repo.get_by_id(record.id).await.unwrap().is_none());
        assert!(!repo.delete(record.id).await.unwrap());
    }
}
