//! Recursive, lazy enumeration of every file below a root directory.

use crate::error::Result;
use crate::fs_access::{DirHandle, EntryHandle, FileAccess, FileHandle};
use futures::stream::{self, Stream, TryStreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A file found while walking the root directory.
///
/// Built once when the walker reaches the file and never changed afterwards;
/// the content is read on first request and cached.
#[derive(Debug)]
pub struct DiscoveredFile {
    name: String,
    relative_path: String,
    parent: Option<DirHandle>,
    handle: FileHandle,
    content: OnceCell<Vec<u8>>,
}

impl DiscoveredFile {
    pub fn new(relative_path: String, parent: Option<DirHandle>, handle: FileHandle) -> Self {
        Self {
            name: handle.name().to_string(),
            relative_path,
            parent,
            handle,
            content: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slash-separated path starting with the root directory's name,
    /// e.g. `icons/Aotearoa/noun_Beehive_147848.svg`.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// The directory holding this file.
    pub fn parent(&self) -> Option<&DirHandle> {
        self.parent.as_ref()
    }

    pub fn handle(&self) -> &FileHandle {
        &self.handle
    }

    /// Raw content, read through `access` on first call.
    pub async fn bytes(&self, access: &dyn FileAccess) -> Result<&[u8]> {
        self.content
            .get_or_try_init(|| access.read_file(&self.handle))
            .await
            .map(Vec::as_slice)
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.name.ends_with(extension)
    }
}

struct Frame {
    dir: DirHandle,
    prefix: String,
    pending: Option<VecDeque<EntryHandle>>,
}

impl Frame {
    fn new(dir: DirHandle, prefix: String) -> Self {
        Self {
            dir,
            prefix,
            pending: None,
        }
    }
}

/// Depth-first walker over an explicit stack of directory frames.
struct Walker {
    access: Arc<dyn FileAccess>,
    stack: Vec<Frame>,
}

impl Walker {
    fn new(access: Arc<dyn FileAccess>) -> Self {
        let root = access.root().clone();
        let prefix = format!("{}/", root.name());
        Self {
            access,
            stack: vec![Frame::new(root, prefix)],
        }
    }

    async fn next(&mut self) -> Option<Result<DiscoveredFile>> {
        loop {
            let frame = self.stack.last_mut()?;

            if frame.pending.is_none() {
                match self.access.list_dir(&frame.dir).await {
                    Ok(entries) => frame.pending = Some(entries.into()),
                    Err(e) => {
                        self.stack.pop();
                        return Some(Err(e));
                    }
                }
            }

            let entry = frame.pending.as_mut().and_then(VecDeque::pop_front);
            match entry {
                None => {
                    self.stack.pop();
                }
                Some(EntryHandle::File(handle)) => {
                    let relative_path = format!("{}{}", frame.prefix, handle.name());
                    let parent = Some(frame.dir.clone());
                    return Some(Ok(DiscoveredFile::new(relative_path, parent, handle)));
                }
                Some(EntryHandle::Directory(dir)) => {
                    let prefix = format!("{}{}/", frame.prefix, dir.name());
                    self.stack.push(Frame::new(dir, prefix));
                }
            }
        }
    }
}

/// Lazily walk every file below the provider's root, depth first.
///
/// Listing failures are yielded as errors; the walk continues with the
/// remaining directories. Restart by calling this again.
pub fn walk_files(access: Arc<dyn FileAccess>) -> impl Stream<Item = Result<DiscoveredFile>> + Send {
    stream::unfold(Walker::new(access), |mut walker| async move {
        walker.next().await.map(|item| (item, walker))
    })
}

/// Walk the whole tree, failing on the first listing error.
pub async fn collect_files(access: Arc<dyn FileAccess>) -> Result<Vec<Arc<DiscoveredFile>>> {
    walk_files(access).map_ok(Arc::new).try_collect().await
}

/// Immediate subdirectories of the root.
pub async fn list_subdirectories(access: &dyn FileAccess) -> Result<Vec<DirHandle>> {
    let entries = access.list_dir(access.root()).await?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            EntryHandle::Directory(dir) => Some(dir),
            EntryHandle::File(_) => None,
        })
        .collect())
}
