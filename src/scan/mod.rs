//! Directory scanner.
//!
//! Walks a [`DirHandle`] with an explicit work stack, skipping VCS and build
//! artifacts. [`scan_stats`] aggregates byte and file totals; [`collect_files`]
//! reads every leaf file for upload. Both tolerate per-entry failures: a file or
//! subdirectory that cannot be read is logged and skipped.

pub mod handle;
pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;

pub use handle::{DirEntry, DirHandle, EntryKind, LocalDir};
pub use memory::MemoryDir;

/// Directories deeper than this (root = 0) are treated as empty.
pub const MAX_DEPTH: usize = 10;

/// Directory names skipped at every depth.
pub const IGNORED_FOLDERS: [&str; 6] = [".git", "node_modules", "dist", "build", ".next", "coverage"];

/// File names skipped at every depth.
pub const IGNORED_FILES: [&str; 2] = [".DS_Store", "Thumbs.db"];

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Aggregate size of a directory subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total_bytes: u64,
    pub file_count: u64,
}

/// A leaf file read during a scan, addressed relative to the scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Slash-joined path relative to the scanned root.
    pub path: String,
    pub content: Vec<u8>,
}

pub fn is_ignored_folder(name: &str) -> bool {
    IGNORED_FOLDERS.contains(&name)
}

pub fn is_ignored_file(name: &str) -> bool {
    IGNORED_FILES.contains(&name)
}

/// Compute total bytes and file count for the subtree under `root`.
///
/// Only a failure to list `root` itself is returned as an error.
pub async fn scan_stats(root: &dyn DirHandle) -> Result<ScanStats, ScanError> {
    let mut visitor = StatsVisitor::default();
    walk(root, &mut visitor).await?;
    Ok(visitor.stats)
}

/// Read every non-ignored leaf file under `root`.
pub async fn collect_files(root: &dyn DirHandle) -> Result<Vec<FileRecord>, ScanError> {
    let mut visitor = CollectVisitor::default();
    walk(root, &mut visitor).await?;
    Ok(visitor.files)
}

#[async_trait]
trait FileVisitor: Send {
    async fn visit(&mut self, dir: &dyn DirHandle, name: &str, path: String) -> Result<(), ScanError>;
}

#[derive(Default)]
struct StatsVisitor {
    stats: ScanStats,
}

#[async_trait]
impl FileVisitor for StatsVisitor {
    async fn visit(&mut self, dir: &dyn DirHandle, name: &str, _path: String) -> Result<(), ScanError> {
        let len = dir.file_len(name).await?;
        self.stats.total_bytes += len;
        self.stats.file_count += 1;
        Ok(())
    }
}

#[derive(Default)]
struct CollectVisitor {
    files: Vec<FileRecord>,
}

#[async_trait]
impl FileVisitor for CollectVisitor {
    async fn visit(&mut self, dir: &dyn DirHandle, name: &str, path: String) -> Result<(), ScanError> {
        let content = dir.read_file(name).await?;
        self.files.push(FileRecord { path, content });
        Ok(())
    }
}

/// A subdirectory waiting to be listed.
struct Pending {
    handle: Box<dyn DirHandle>,
    depth: usize,
    path: String,
}

async fn walk(root: &dyn DirHandle, visitor: &mut dyn FileVisitor) -> Result<(), ScanError> {
    let mut stack: Vec<Pending> = Vec::new();

    let entries = root.list().await?;
    expand(root, entries, 0, "", visitor, &mut stack).await;

    while let Some(pending) = stack.pop() {
        let entries = match pending.handle.list().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %pending.path, error = %e, "failed to list directory, skipping");
                continue;
            }
        };
        expand(
            pending.handle.as_ref(),
            entries,
            pending.depth,
            &pending.path,
            visitor,
            &mut stack,
        )
        .await;
    }

    Ok(())
}

/// Visit the files of one directory and push its subdirectories onto `stack`.
async fn expand(
    dir: &dyn DirHandle,
    entries: Vec<DirEntry>,
    depth: usize,
    base: &str,
    visitor: &mut dyn FileVisitor,
    stack: &mut Vec<Pending>,
) {
    for entry in entries {
        if is_ignored_file(&entry.name) {
            continue;
        }
        let path = join_path(base, &entry.name);

        match entry.kind {
            EntryKind::File => {
                if let Err(e) = visitor.visit(dir, &entry.name, path.clone()).await {
                    tracing::warn!(path = %path, error = %e, "failed to read file, skipping");
                }
            }
            EntryKind::Directory => {
                if is_ignored_folder(&entry.name) {
                    continue;
                }
                let child_depth = depth + 1;
                if child_depth > MAX_DEPTH {
                    tracing::debug!(path = %path, "depth cap reached, treating as empty");
                    continue;
                }
                match dir.open_dir(&entry.name).await {
                    Ok(handle) => stack.push(Pending {
                        handle,
                        depth: child_depth,
                        path,
                    }),
                    Err(e) => {
                        tracing::warn!(path = %path, error = %e, "failed to open directory, skipping");
                    }
                }
            }
        }
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}
