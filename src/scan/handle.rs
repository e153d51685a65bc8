//! Directory capabilities.
//!
//! The scanner never touches raw path strings. It is handed a [`DirHandle`] and
//! only reaches children by name through that handle, so a revoked or failing
//! capability surfaces as an error on the individual call.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use super::ScanError;

/// Kind of a directory entry as reported by [`DirHandle::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// An opaque, readable directory capability.
///
/// Listing order is whatever the implementation yields; callers must not rely on it.
#[async_trait]
pub trait DirHandle: Send + Sync {
    /// Name of this directory (the last path component).
    fn name(&self) -> &str;

    /// List the immediate children.
    async fn list(&self) -> Result<Vec<DirEntry>, ScanError>;

    /// Size in bytes of the child file `name`.
    async fn file_len(&self, name: &str) -> Result<u64, ScanError>;

    /// Full contents of the child file `name`.
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, ScanError>;

    /// Open the child directory `name`.
    async fn open_dir(&self, name: &str) -> Result<Box<dyn DirHandle>, ScanError>;
}

/// A [`DirHandle`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDir {
    path: PathBuf,
    name: String,
}

impl LocalDir {
    /// Open `path` as a directory capability. Fails if it is not a readable directory.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ScanError::io(&path, e))?;
        if !meta.is_dir() {
            return Err(ScanError::NotADirectory(path.display().to_string()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a child name, refusing anything that is not a single plain component.
    fn child(&self, name: &str) -> Result<PathBuf, ScanError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.path.join(name)),
            _ => Err(ScanError::NotFound(name.to_string())),
        }
    }
}

#[async_trait]
impl DirHandle for LocalDir {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<DirEntry>, ScanError> {
        let mut reader = tokio::fs::read_dir(&self.path)
            .await
            .map_err(|e| ScanError::io(&self.path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ScanError::io(&self.path, e))?
        {
            let file_type = match entry.file_type().await {
                Ok(ft) => ft,
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "failed to stat entry");
                    continue;
                }
            };
            // A non-UTF-8 name cannot be addressed through `DirHandle`.
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!(
                        dir = %self.path.display(),
                        name = %raw.to_string_lossy(),
                        "skipping entry with non-UTF-8 name"
                    );
                    continue;
                }
            };
            // Symlinks are neither followed nor counted.
            if file_type.is_dir() {
                entries.push(DirEntry::directory(name));
            } else if file_type.is_file() {
                entries.push(DirEntry::file(name));
            }
        }
        Ok(entries)
    }

    async fn file_len(&self, name: &str) -> Result<u64, ScanError> {
        let path = self.child(name)?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ScanError::io(&path, e))?;
        Ok(meta.len())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, ScanError> {
        let path = self.child(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| ScanError::io(&path, e))
    }

    async fn open_dir(&self, name: &str) -> Result<Box<dyn DirHandle>, ScanError> {
        let path = self.child(name)?;
        Ok(Box::new(LocalDir::open(path).await?))
    }
}
