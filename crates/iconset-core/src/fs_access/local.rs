//! File access backed by the local filesystem.

use super::atomic::atomic_write_bytes;
use super::{AccessMode, DirHandle, EntryHandle, FileAccess, FileHandle, PermissionState};
use crate::error::{IconError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `FileAccess` over a directory on local disk.
///
/// Handle locations are absolute paths. Writes go through the atomic
/// temp-file-then-rename path, so an interrupted save never leaves a
/// half-written metadata file behind.
pub struct LocalFileAccess {
    root: DirHandle,
    keep_backups: bool,
}

impl LocalFileAccess {
    /// Open a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let metadata = std::fs::metadata(&root).map_err(|e| IconError::io_with_path(e, &root))?;
        if !metadata.is_dir() {
            return Err(IconError::NotADirectory(root));
        }

        let root = std::fs::canonicalize(&root).map_err(|e| IconError::io_with_path(e, &root))?;
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());

        Ok(Self {
            root: DirHandle::new(name, root),
            keep_backups: false,
        })
    }

    /// Keep a `.bak` copy of every file before it is replaced.
    pub fn with_backups(mut self, keep_backups: bool) -> Self {
        self.keep_backups = keep_backups;
        self
    }

    pub fn root_path(&self) -> &Path {
        self.root.location()
    }

    /// Probe write access by creating and dropping a temp file in the root.
    fn check_writable(&self) -> bool {
        match tempfile::Builder::new()
            .prefix(".iconset-write-check")
            .tempfile_in(self.root.location())
        {
            Ok(_) => true,
            Err(e) => {
                debug!(
                    "Write check failed in {}: {}",
                    self.root.location().display(),
                    e
                );
                false
            }
        }
    }
}

#[async_trait]
impl FileAccess for LocalFileAccess {
    fn root(&self) -> &DirHandle {
        &self.root
    }

    async fn query_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        let metadata = tokio::fs::metadata(self.root.location())
            .await
            .map_err(|e| IconError::io_with_path(e, self.root.location()))?;

        Ok(match mode {
            AccessMode::Read => PermissionState::Granted,
            AccessMode::ReadWrite if metadata.permissions().readonly() => PermissionState::Prompt,
            AccessMode::ReadWrite => PermissionState::Granted,
        })
    }

    async fn request_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        Ok(match mode {
            AccessMode::Read => PermissionState::Granted,
            AccessMode::ReadWrite if self.check_writable() => PermissionState::Granted,
            AccessMode::ReadWrite => PermissionState::Denied,
        })
    }

    async fn list_dir(&self, dir: &DirHandle) -> Result<Vec<EntryHandle>> {
        let mut read_dir = tokio::fs::read_dir(dir.location())
            .await
            .map_err(|e| IconError::io_with_path(e, dir.location()))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| IconError::io_with_path(e, dir.location()))?
        {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| IconError::io_with_path(e, &path))?;

            if file_type.is_dir() {
                entries.push(EntryHandle::Directory(DirHandle::new(name, path)));
            } else if file_type.is_file() {
                entries.push(EntryHandle::File(FileHandle::new(name, path)));
            } else {
                debug!("Skipping non-regular entry {}", path.display());
            }
        }

        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entries)
    }

    async fn read_file(&self, file: &FileHandle) -> Result<Vec<u8>> {
        tokio::fs::read(file.location())
            .await
            .map_err(|e| IconError::io_with_path(e, file.location()))
    }

    async fn write_file(&self, file: &FileHandle, contents: &[u8]) -> Result<()> {
        atomic_write_bytes(file.location(), contents, self.keep_backups)
    }

    async fn create_file(&self, dir: &DirHandle, name: &str) -> Result<FileHandle> {
        let path = dir.location().join(name);
        tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .open(&path)
            .await
            .map_err(|e| IconError::io_with_path(e, &path))?;
        Ok(FileHandle::new(name, path))
    }
}
