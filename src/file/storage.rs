//! Physical file storage for filehub.
//!
//! Every uploaded object lives directly under one root directory, named by
//! its locator:
//! ```text
//! {root}/
//! ├── 0c6f1d7e-3c1b-4d8e-9a51-2f6f4b1c9e20_report.pdf
//! ├── 9b2e4a10-77d4-4c36-8f3e-5d1a0b7c6e11_photo.png
//! └── ...
//! ```
//! All operations are blocking; async callers go through `spawn_blocking`.

use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::MAX_FILENAME_LENGTH;
use crate::{FilehubError, Result};

/// Name used when sanitizing leaves nothing usable.
const FALLBACK_NAME: &str = "file";

/// A single stored object packaged as a zip archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipArchive {
    /// Suggested download name, always ending in `.zip`.
    pub file_name: String,
    /// Complete archive bytes.
    pub bytes: Vec<u8>,
}

/// Storage backend over a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Persist `content` under a fresh locator and return the locator.
    ///
    /// The locator is `{uuid}_{sanitized original name}`. An existing file is
    /// never overwritten; a clash surfaces as an I/O error.
    pub fn put(&self, content: &[u8], original_name: &str) -> Result<String> {
        self.ensure_root()?;

        let locator = format!("{}_{}", Uuid::new_v4(), sanitize_name(original_name));
        let path = self.root.join(&locator);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        let written = file.write_all(content).and_then(|()| file.sync_all());
        drop(file);
        if let Err(e) = written {
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        Ok(locator)
    }

    /// Read the bytes stored under `locator`.
    pub fn get(&self, locator: &str) -> Result<Vec<u8>> {
        let path = self.locator_path(locator)?;

        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FilehubError::NotFound(format!("stored file {locator}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the object stored under `locator`.
    ///
    /// Returns `true` if a file was removed and `false` if it was already gone.
    pub fn delete(&self, locator: &str) -> Result<bool> {
        let path = self.locator_path(locator)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if an object exists under `locator`.
    pub fn exists(&self, locator: &str) -> bool {
        self.locator_path(locator)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Resolve a client-supplied name to a readable file inside the root.
    ///
    /// The name is normalized lexically. Absolute paths and any `..` that
    /// would climb above the root are rejected with `InvalidPath`. Symlinks and
    /// directories are reported as `NotFound`.
    pub fn resolve_for_view(&self, name: &str) -> Result<PathBuf> {
        let mut relative = PathBuf::new();

        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !relative.pop() {
                        return Err(FilehubError::InvalidPath(name.to_string()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(FilehubError::InvalidPath(name.to_string()));
                }
            }
        }

        if relative.as_os_str().is_empty() {
            return Err(FilehubError::InvalidPath(name.to_string()));
        }

        let path = self.root.join(relative);
        match fs::symlink_metadata(&path) {
            Ok(m) if m.file_type().is_file() => Ok(path),
            Ok(_) => Err(FilehubError::NotFound(format!("file {name}"))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FilehubError::NotFound(format!("file {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Package the object under `locator` as a single-entry zip archive.
    ///
    /// The entry carries the original file name. `archive_name` gets a
    /// `.zip` suffix unless it already has one; when blank the entry name is
    /// used instead.
    pub fn zip(&self, locator: &str, archive_name: &str) -> Result<ZipArchive> {
        let content = self.get(locator)?;
        let entry_name = original_name(locator);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(entry_name, options)?;
        writer.write_all(&content)?;
        let bytes = writer.finish()?.into_inner();

        let base = match archive_name.trim() {
            "" => entry_name,
            name => name,
        };
        let file_name = if base.to_ascii_lowercase().ends_with(".zip") {
            base.to_string()
        } else {
            format!("{base}.zip")
        };

        Ok(ZipArchive { file_name, bytes })
    }

    /// Map a locator to its path, rejecting anything but a plain file name.
    fn locator_path(&self, locator: &str) -> Result<PathBuf> {
        let mut components = Path::new(locator).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(locator)),
            _ => Err(FilehubError::InvalidPath(locator.to_string())),
        }
    }
}

/// Recover the original file name from a locator.
///
/// Locators without a token prefix are returned unchanged.
pub fn original_name(locator: &str) -> &str {
    match locator.split_once('_') {
        Some((token, name)) if Uuid::parse_str(token).is_ok() && !name.is_empty() => name,
        _ => locator,
    }
}

/// Make a client-supplied file name safe to use as part of a locator.
///
/// ASCII alphanumerics, `-`, `_` and `.` are kept; everything else, path
/// separators included, becomes `_`. Leading dots are dropped and the result
/// is capped at [`MAX_FILENAME_LENGTH`] characters.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed: String = cleaned
        .trim_start_matches('.')
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .collect();

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed
    }
}
