//! File access capability consumed by the scanner and the category model.
//!
//! This module provides:
//! - Handle types for directories and files
//! - The `FileAccess` trait (list, read, write, create, permissions)
//! - A local-disk implementation with atomic writes
//! - An in-memory implementation for tests and previews

mod atomic;
mod local;
mod memory;

pub use atomic::{atomic_read_json, atomic_write_bytes, atomic_write_json};
pub use local::LocalFileAccess;
pub use memory::MemoryFileAccess;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A directory the provider can list.
///
/// Two handles refer to the same directory when their locations are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirHandle {
    name: String,
    location: PathBuf,
}

impl DirHandle {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    /// The directory's own name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provider-specific location used to reopen the directory.
    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// A file the provider can read and write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    name: String,
    location: PathBuf,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryHandle {
    File(FileHandle),
    Directory(DirHandle),
}

impl EntryHandle {
    pub fn name(&self) -> &str {
        match self {
            EntryHandle::File(f) => f.name(),
            EntryHandle::Directory(d) => d.name(),
        }
    }
}

/// Access level requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    ReadWrite,
}

/// Outcome of a permission query or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not granted yet; a request may still succeed.
    Prompt,
}

/// Capability to browse and modify one root directory tree.
#[async_trait]
pub trait FileAccess: Send + Sync {
    /// The root directory this provider was opened on.
    fn root(&self) -> &DirHandle;

    /// Check the current grant without prompting.
    async fn query_permission(&self, mode: AccessMode) -> Result<PermissionState>;

    /// Ask for a grant.
    async fn request_permission(&self, mode: AccessMode) -> Result<PermissionState>;

    /// List the immediate children of a directory.
    async fn list_dir(&self, dir: &DirHandle) -> Result<Vec<EntryHandle>>;

    /// Read a file's full content.
    async fn read_file(&self, file: &FileHandle) -> Result<Vec<u8>>;

    /// Replace a file's content in full.
    async fn write_file(&self, file: &FileHandle, contents: &[u8]) -> Result<()>;

    /// Create an empty file in `dir`, or open it if it already exists.
    async fn create_file(&self, dir: &DirHandle, name: &str) -> Result<FileHandle>;
}
