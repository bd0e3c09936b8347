//! File service for filehub.
//!
//! This module orchestrates the file store and the catalog:
//! - Upload: persist bytes, then record them (bytes are removed again if the
//!   record cannot be created)
//! - Download, zip download and view-by-name
//! - Owner-checked update and delete, serialized per record id

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::{Database, OwnerRepository};
use crate::{FilehubError, Result};

use super::guard::require_owner;
use super::lock::RecordLocks;
use super::record::{FileRecord, FileRepository, NewFileRecord};
use super::storage::{original_name, FileStore, ZipArchive};
use super::DEFAULT_MAX_FILE_SIZE;

/// Request data for file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Owner the file will belong to.
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    /// Original filename as sent by the client.
    pub file_name: String,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(
        owner_id: i64,
        title: impl Into<String>,
        file_name: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            owner_id,
            title: title.into(),
            description: String::new(),
            file_name: file_name.into(),
            content,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Result of a file download.
#[derive(Debug)]
pub struct DownloadResult {
    /// Catalog entry of the file.
    pub record: FileRecord,
    /// Name the file was uploaded with.
    pub file_name: String,
    /// File content.
    pub content: Vec<u8>,
}

/// Result of viewing a stored object by name.
#[derive(Debug)]
pub struct ViewResult {
    /// Name to present to the client.
    pub file_name: String,
    /// File content.
    pub content: Vec<u8>,
}

/// File service shared by all request handlers.
#[derive(Debug, Clone)]
pub struct FileService {
    pool: SqlitePool,
    store: Arc<FileStore>,
    public_base_url: String,
    max_file_size: u64,
    locks: RecordLocks,
}

impl FileService {
    /// Create a new FileService.
    pub fn new(db: &Database, store: FileStore, public_base_url: impl Into<String>) -> Self {
        Self {
            pool: db.pool().clone(),
            store: Arc::new(store),
            public_base_url: public_base_url.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            locks: RecordLocks::new(),
        }
    }

    /// Create a new FileService with a custom max file size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Get the underlying file store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Get the maximum accepted file size in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Public URL for a locator.
    pub fn public_url(&self, locator: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.public_base_url.trim_end_matches('/'),
            locator
        )
    }

    /// Upload a file for an owner.
    ///
    /// Fails with `OwnerNotFound` before anything is written when the owner
    /// does not exist.
    pub async fn upload(&self, request: UploadRequest) -> Result<FileRecord> {
        if request.content.len() as u64 > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(FilehubError::Validation(format!(
                "file is too large (max {max_mb} MB)"
            )));
        }

        let owner = OwnerRepository::new(&self.pool)
            .get_by_id(request.owner_id)
            .await?;
        if owner.is_none() {
            return Err(FilehubError::OwnerNotFound(request.owner_id));
        }

        let UploadRequest {
            owner_id,
            title,
            description,
            file_name,
            content,
        } = request;

        let locator = self
            .blocking(move |store| store.put(&content, &file_name))
            .await?;

        let new_file = NewFileRecord::new(owner_id, title, &locator, self.public_url(&locator))
            .with_description(description);

        match FileRepository::new(&self.pool).create(&new_file).await {
            Ok(record) => {
                info!(
                    file_id = record.id,
                    owner_id,
                    locator = %record.storage_locator,
                    "file uploaded"
                );
                Ok(record)
            }
            Err(e) => {
                let orphan = locator.clone();
                if let Err(cleanup) = self.blocking(move |store| store.delete(&orphan)).await {
                    warn!(locator = %locator, error = %cleanup, "failed to remove orphaned upload");
                }
                Err(e)
            }
        }
    }

    /// Find a file record by id.
    pub async fn find(&self, file_id: i64) -> Result<Option<FileRecord>> {
        FileRepository::new(&self.pool).get_by_id(file_id).await
    }

    /// Get a file record by id, failing with `NotFound` when absent.
    pub async fn get(&self, file_id: i64) -> Result<FileRecord> {
        self.find(file_id)
            .await?
            .ok_or_else(|| FilehubError::NotFound(format!("file {file_id}")))
    }

    /// List every file record.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        FileRepository::new(&self.pool).list_all().await
    }

    /// List the file records of one owner.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        FileRepository::new(&self.pool).list_by_owner(owner_id).await
    }

    /// Search by title or owner name.
    pub async fn search(&self, query: &str) -> Result<Vec<FileRecord>> {
        FileRepository::new(&self.pool).search(query).await
    }

    /// Overwrite title and description of a file owned by `requester`.
    pub async fn update(
        &self,
        file_id: i64,
        title: &str,
        description: &str,
        requester: i64,
    ) -> Result<FileRecord> {
        let _guard = self.locks.lock(file_id).await;
        let repo = FileRepository::new(&self.pool);

        let record = repo
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| FilehubError::NotFound(format!("file {file_id}")))?;
        require_owner(&record, requester)?;

        let updated = repo
            .update_details(file_id, title, description)
            .await?
            .ok_or_else(|| FilehubError::NotFound(format!("file {file_id}")))?;

        info!(file_id, owner_id = requester, "file updated");
        Ok(updated)
    }

    /// Delete a file owned by `requester`.
    ///
    /// The stored bytes go first; a missing object counts as removed. Any
    /// other storage error aborts and the record is kept.
    pub async fn delete(&self, file_id: i64, requester: i64) -> Result<()> {
        let _guard = self.locks.lock(file_id).await;
        let repo = FileRepository::new(&self.pool);

        let record = repo
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| FilehubError::NotFound(format!("file {file_id}")))?;
        require_owner(&record, requester)?;

        let locator = record.storage_locator.clone();
        let removed = self
            .blocking(move |store| store.delete(&locator))
            .await?;
        if !removed {
            warn!(
                file_id,
                locator = %record.storage_locator,
                "stored bytes were already missing"
            );
        }

        repo.delete(file_id).await?;
        info!(file_id, owner_id = requester, "file deleted");
        Ok(())
    }

    /// Load a file's bytes by record id.
    pub async fn download(&self, file_id: i64) -> Result<DownloadResult> {
        let record = self.get(file_id).await?;

        let locator = record.storage_locator.clone();
        let content = self.blocking(move |store| store.get(&locator)).await?;

        Ok(DownloadResult {
            file_name: original_name(&record.storage_locator).to_string(),
            record,
            content,
        })
    }

    /// Package a file as a zip archive named after its title.
    pub async fn download_zip(&self, file_id: i64) -> Result<ZipArchive> {
        let record = self.get(file_id).await?;

        let locator = record.storage_locator;
        let title = record.title;
        self.blocking(move |store| store.zip(&locator, &title))
            .await
    }

    /// Read a stored object by its name in the storage root.
    ///
    /// Names escaping the root are rejected with `InvalidPath`.
    pub async fn view(&self, name: &str) -> Result<ViewResult> {
        let name = name.to_string();
        self.blocking(move |store| {
            let path: PathBuf = store.resolve_for_view(&name)?;
            let content = read_resolved(&path, &name)?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| original_name(n).to_string())
                .unwrap_or(name);
            Ok(ViewResult { file_name, content })
        })
        .await
    }

    /// Run blocking store I/O on the blocking thread pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&FileStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| FilehubError::Io(io::Error::other(e)))?
    }
}

/// Read a path returned by `resolve_for_view`.
///
/// The object can vanish between resolution and the read when a delete runs
/// concurrently; that reader sees `NotFound`.
fn read_resolved(path: &Path, name: &str) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(FilehubError::NotFound(format!("stored file {name}")))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewOwner;
    use crate::id::is_valid_id;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        service: FileService,
        ann: i64,
        bob: i64,
    }

    async fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let owners = OwnerRepository::new(db.pool());
        let ann = owners
            .create(&NewOwner::new("Ann", "Lee", "ann@example.com", "pw"))
            .await
            .unwrap()
            .id;
        let bob = owners
            .create(&NewOwner::new("Bob", "Ray", "bob@example.com", "pw"))
            .await
            .unwrap()
            .id;

        let store = FileStore::new(temp_dir.path().join("uploads"));
        let service = FileService::new(&db, store, "http://files.test/");
        Fixture {
            _temp_dir: temp_dir,
            service,
            ann,
            bob,
        }
    }

    fn report(owner_id: i64) -> UploadRequest {
        UploadRequest::new(owner_id, "Report", "report.txt", b"quarterly".to_vec())
            .with_description("Q3 numbers")
    }

    #[tokio::test]
    async fn test_upload_and_download() {
        let f = setup().await;

        let record = f.service.upload(report(f.ann)).await.unwrap();
        assert!(is_valid_id(Some(record.id)));
        assert_eq!(record.owner_id, f.ann);
        assert_eq!(record.description, "Q3 numbers");
        assert!(record.storage_locator.ends_with("_report.txt"));
        assert_eq!(
            record.public_url,
            format!("http://files.test/uploads/{}", record.storage_locator)
        );

        let download = f.service.download(record.id).await.unwrap();
        assert_eq!(download.content, b"quarterly");
        assert_eq!(download.file_name, "report.txt");
    }

    #[tokio::test]
    async fn test_upload_unknown_owner_writes_nothing() {
        let f = setup().await;

        let err = f.service.upload(report(12_121_212)).await.unwrap_err();
        assert!(matches!(err, FilehubError::OwnerNotFound(12_121_212)));

        let root = f.service.store().root().to_path_buf();
        let entries = std::fs::read_dir(&root).map(|d| d.count()).unwrap_or(0);
        assert_eq!(entries, 0);
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let f = setup().await;
        let service = f.service.clone().with_max_file_size(4);

        let err = service.upload(report(f.ann)).await.unwrap_err();
        assert!(matches!(err, FilehubError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_by_owner() {
        let f = setup().await;
        let record = f.service.upload(report(f.ann)).await.unwrap();

        let updated = f
            .service
            .update(record.id, "Final Report", "done", f.ann)
            .await
            .unwrap();
        assert_eq!(updated.title, "Final Report");
        assert_eq!(updated.description, "done");
        assert_eq!(updated.storage_locator, record.storage_locator);
    }

    #[tokio::test]
    async fn test_update_by_other_is_forbidden() {
        let f = setup().await;
        let record = f.service.upload(report(f.ann)).await.unwrap();

        let err = f
            .service
            .update(record.id, "Hijacked", "", f.bob)
            .await
            .unwrap_err();
        assert!(matches!(err, FilehubError::Forbidden(_)));

        let unchanged = f.service.get(record.id).await.unwrap();
        assert_eq!(unchanged, record);
    }

    #[tokio::test]
    async fn test_update_missing_file() {
        let f = setup().await;
        let err = f
            .service
            .update(12_345_678, "x", "y", f.ann)
            .await
            .unwrap_err();
        assert!(matches!(err, FilehubError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_bytes() {
        let f = setup().await;
        let record = f.service.upload(report(f.ann)).await.unwrap();
        assert!(f.service.store().exists(&record.storage_locator));

        f.service.delete(record.id, f.ann).await.unwrap();

        assert!(f.service.find(record.id).await.unwrap().is_none());
        assert!(!f.service.store().exists(&record.storage_locator));
    }

    #[tokio::test]
    async fn test_delete_with_missing_bytes_still_removes_record() {
        let f = setup().await;
        let record = f.service.upload(report(f.ann)).await.unwrap();
        f.service.store().delete(&record.storage_locator).unwrap();

        f.service.delete(record.id, f.ann).await.unwrap();
        assert!(f.service.find(record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_storage_failure_keeps_record() {
        let f = setup().await;
        let record = f.service.upload(report(f.ann)).await.unwrap();

        let path = f.service.store().root().join(&record.storage_locator);
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inner.txt"), b"x").unwrap();

        let err = f.service.delete(record.id, f.ann).await.unwrap_err();
        assert!(matches!(err, FilehubError::Io(_)));
        let kept = f.service.find(record.id).await.unwrap().unwrap();
        assert_eq!(kept.storage_locator, record.storage_locator);
    }

    #[tokio::test]
    async fn test_delete_by_other_keeps_everything() {
        let f = setup().await;
        let record = f.service.upload(report(f.ann)).await.unwrap();

        let err = f.service.delete(record.id, f.bob).await.unwrap_err();
        assert!(matches!(err, FilehubError::Forbidden(_)));
        assert!(f.service.find(record.id).await.unwrap().is_some());
        assert!(f.service.store().exists(&record.storage_locator));
    }

    #[tokio::test]
    async fn test_delete_missing_file() {
        let f = setup().await;
        let err = f.service.delete(12_345_678, f.ann).await.unwrap_err();
        assert!(matches!(err, FilehubError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_and_listing() {
        let f = setup().await;
        f.service.upload(report(f.ann)).await.unwrap();
        f.service
            .upload(UploadRequest::new(f.bob, "Photos", "beach.png", vec![1, 2, 3]))
            .await
            .unwrap();

        assert_eq!(f.service.search("ann").await.unwrap().len(), 1);
        assert_eq!(f.service.search("report").await.unwrap().len(), 1);
        assert_eq!(f.service.search("").await.unwrap().len(), 2);
        assert_eq!(f.service.list_by_owner(f.bob).await.unwrap().len(), 1);
        assert_eq!(f.service.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_download_zip_named_after_title() {
        let f = setup().await;
        let record = f.service.upload(report(f.ann)).await.unwrap();

        let archive = f.service.download_zip(record.id).await.unwrap();
        assert_eq!(archive.file_name, "Report.zip");
        assert!(archive.bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_view_by_locator() {
        let f = setup().await;
        let record = f.service.upload(report(f.ann)).await.unwrap();

        let view = f.service.view(&record.storage_locator).await.unwrap();
        assert_eq!(view.content, b"quarterly");
        assert_eq!(view.file_name, "report.txt");

        let err = f.service.view("../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, FilehubError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_public_url_trims_trailing_slash() {
        let f = setup().await;
        assert_eq!(f.service.public_url("abc"), "http://files.test/uploads/abc");
    }

    #[test]
    fn test_read_resolved_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("deleted_meanwhile.txt");

        let err = read_resolved(&gone, "deleted_meanwhile.txt").unwrap_err();
        assert!(matches!(err, FilehubError::NotFound(_)));
    }
}
