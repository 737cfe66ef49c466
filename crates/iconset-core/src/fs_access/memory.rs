//! In-memory file access.

use super::{AccessMode, DirHandle, EntryHandle, FileAccess, FileHandle, PermissionState};
use crate::error::{IconError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tree {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
    writes: usize,
}

/// `FileAccess` over an in-memory tree.
///
/// Locations are `/`-separated paths starting with the root's name. Useful
/// as a test double and for previewing a catalog without touching disk.
pub struct MemoryFileAccess {
    root: DirHandle,
    tree: Mutex<Tree>,
    query_state: PermissionState,
    request_state: PermissionState,
    failing_writes: HashSet<PathBuf>,
}

impl MemoryFileAccess {
    pub fn new(root_name: &str) -> Self {
        let root = DirHandle::new(root_name, root_name);
        let mut tree = Tree::default();
        tree.dirs.insert(PathBuf::from(root_name));
        Self {
            root,
            tree: Mutex::new(tree),
            query_state: PermissionState::Granted,
            request_state: PermissionState::Granted,
            failing_writes: HashSet::new(),
        }
    }

    /// Add a file at `relative` (below the root), creating parent directories.
    pub fn with_file(self, relative: &str, contents: impl AsRef<[u8]>) -> Self {
        let path = self.root.location().join(relative);
        {
            let mut tree = self.lock();
            let mut parent = path.parent();
            while let Some(dir) = parent {
                if dir.as_os_str().is_empty() {
                    break;
                }
                tree.dirs.insert(dir.to_path_buf());
                parent = dir.parent();
            }
            tree.files.insert(path, contents.as_ref().to_vec());
        }
        self
    }

    /// Add an empty directory at `relative`.
    pub fn with_dir(self, relative: &str) -> Self {
        let path = self.root.location().join(relative);
        self.lock().dirs.insert(path);
        self
    }

    /// Permission answers returned by `query_permission` and `request_permission`.
    pub fn with_permissions(mut self, query: PermissionState, request: PermissionState) -> Self {
        self.query_state = query;
        self.request_state = request;
        self
    }

    /// Make every write to `relative` fail.
    pub fn with_failing_write(mut self, relative: &str) -> Self {
        self.failing_writes.insert(self.root.location().join(relative));
        self
    }

    /// Current content of the file at `relative`.
    pub fn contents(&self, relative: &str) -> Option<Vec<u8>> {
        let path = self.root.location().join(relative);
        self.lock().files.get(&path).cloned()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl FileAccess for MemoryFileAccess {
    fn root(&self) -> &DirHandle {
        &self.root
    }

    async fn query_permission(&self, _mode: AccessMode) -> Result<PermissionState> {
        Ok(self.query_state)
    }

    async fn request_permission(&self, _mode: AccessMode) -> Result<PermissionState> {
        Ok(self.request_state)
    }

    async fn list_dir(&self, dir: &DirHandle) -> Result<Vec<EntryHandle>> {
        let tree = self.lock();
        if !tree.dirs.contains(dir.location()) {
            return Err(IconError::FileNotFound(dir.location().to_path_buf()));
        }

        let mut entries: Vec<EntryHandle> = tree
            .dirs
            .iter()
            .filter(|d| d.parent() == Some(dir.location()))
            .map(|d| EntryHandle::Directory(DirHandle::new(name_of(d), d.clone())))
            .collect();
        entries.extend(
            tree.files
                .keys()
                .filter(|f| f.parent() == Some(dir.location()))
                .map(|f| EntryHandle::File(FileHandle::new(name_of(f), f.clone()))),
        );
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entries)
    }

    async fn read_file(&self, file: &FileHandle) -> Result<Vec<u8>> {
        self.lock()
            .files
            .get(file.location())
            .cloned()
            .ok_or_else(|| IconError::FileNotFound(file.location().to_path_buf()))
    }

    async fn write_file(&self, file: &FileHandle, contents: &[u8]) -> Result<()> {
        if self.failing_writes.contains(file.location()) {
            return Err(IconError::Io {
                message: "simulated write failure".to_string(),
                path: Some(file.location().to_path_buf()),
                source: None,
            });
        }
        let mut tree = self.lock();
        tree.files
            .insert(file.location().to_path_buf(), contents.to_vec());
        tree.writes += 1;
        Ok(())
    }

    async fn create_file(&self, dir: &DirHandle, name: &str) -> Result<FileHandle> {
        let path = dir.location().join(name);
        let mut tree = self.lock();
        if !tree.dirs.contains(dir.location()) {
            return Err(IconError::FileNotFound(dir.location().to_path_buf()));
        }
        tree.files.entry(path.clone()).or_default();
        Ok(FileHandle::new(name, path))
    }
}
