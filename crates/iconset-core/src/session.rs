//! Filesystem session: one opened root directory and its scanned catalog.
//!
//! The session moves through three states:
//! - **Unopened**: no provider yet (`open(None)` fails with `NoDirectoryHandle`)
//! - **Opened**: read-write permission granted
//! - **Scanned**: categories and orphans computed, on first request
//!
//! The scan runs once per session; every later accessor reuses its result.

use crate::catalog::{
    classify_unmatched, is_metadata_file, match_category, parse_category_file, Category,
    DuplicateIconId, FileIndex, MissingIconFile, OrphanGroup,
};
use crate::error::{IconError, Result};
use crate::fs_access::{AccessMode, DirHandle, FileAccess, LocalFileAccess, PermissionState};
use crate::walk::{collect_files, list_subdirectories};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to do with a `meta.json` that is not valid JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanPolicy {
    /// Skip the file with a warning and record it in `ScanIssues`.
    /// Its folder is left out of orphan classification.
    #[default]
    Lenient,
    /// Abort the whole scan with the parse error.
    Strict,
}

/// A metadata file skipped by a lenient scan.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidMetadata {
    pub path: String,
    pub message: String,
}

/// Non-fatal findings from a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanIssues {
    pub missing_files: Vec<MissingIconFile>,
    pub invalid_metadata: Vec<InvalidMetadata>,
    pub duplicate_ids: Vec<DuplicateIconId>,
}

impl ScanIssues {
    pub fn is_empty(&self) -> bool {
        self.missing_files.is_empty()
            && self.invalid_metadata.is_empty()
            && self.duplicate_ids.is_empty()
    }
}

#[derive(Debug)]
struct ScanResult {
    categories: Vec<Category>,
    orphans: Vec<OrphanGroup>,
    issues: ScanIssues,
}

/// A category that could not be written during a bulk save.
#[derive(Debug)]
pub struct CategorySaveFailure {
    pub category: String,
    pub error: IconError,
}

/// Outcome of `IconFilesystem::save`.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub saved: Vec<String>,
    pub failed: Vec<CategorySaveFailure>,
}

impl SaveReport {
    /// Whether every category was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// An opened icon root and its lazily computed catalog.
pub struct IconFilesystem {
    access: Arc<dyn FileAccess>,
    policy: ScanPolicy,
    folders: Option<Vec<DirHandle>>,
    scan: Option<ScanResult>,
}

impl IconFilesystem {
    /// Open a session on a provider, checking then requesting read-write access.
    ///
    /// `None` stands for a cancelled directory selection.
    pub async fn open(access: Option<Arc<dyn FileAccess>>) -> Result<Self> {
        let access = access.ok_or(IconError::NoDirectoryHandle)?;
        let mode = AccessMode::ReadWrite;

        if access.query_permission(mode).await? == PermissionState::Granted {
            debug!("Permission already granted for {}", access.root().name());
            return Ok(Self::with_access(access));
        }

        if access.request_permission(mode).await? == PermissionState::Granted {
            debug!("Permission granted on request for {}", access.root().name());
            return Ok(Self::with_access(access));
        }

        Err(IconError::PermissionDenied(
            access.root().location().to_path_buf(),
        ))
    }

    /// Open a session on a local directory.
    pub async fn open_local(root: impl Into<PathBuf>) -> Result<Self> {
        let access = LocalFileAccess::new(root)?;
        Self::open(Some(Arc::new(access))).await
    }

    fn with_access(access: Arc<dyn FileAccess>) -> Self {
        Self {
            access,
            policy: ScanPolicy::default(),
            folders: None,
            scan: None,
        }
    }

    /// Set how malformed metadata is handled. Takes effect on the first scan.
    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn access(&self) -> &Arc<dyn FileAccess> {
        &self.access
    }

    pub fn root(&self) -> &DirHandle {
        self.access.root()
    }

    pub fn is_scanned(&self) -> bool {
        self.scan.is_some()
    }

    /// Top-level subdirectories of the root, listed once.
    pub async fn folders(&mut self) -> Result<&[DirHandle]> {
        if self.folders.is_none() {
            self.folders = Some(list_subdirectories(self.access.as_ref()).await?);
        }
        Ok(self.folders.as_deref().unwrap_or_default())
    }

    pub async fn categories(&mut self) -> Result<&[Category]> {
        Ok(&self.scanned().await?.categories)
    }

    pub async fn categories_mut(&mut self) -> Result<&mut Vec<Category>> {
        Ok(&mut self.scanned().await?.categories)
    }

    pub async fn orphans(&mut self) -> Result<&[OrphanGroup]> {
        Ok(&self.scanned().await?.orphans)
    }

    pub async fn issues(&mut self) -> Result<&ScanIssues> {
        Ok(&self.scanned().await?.issues)
    }

    /// Save every category, one after another.
    ///
    /// A failure does not stop the remaining saves; failures are collected in
    /// the report. Only a failing scan makes this return `Err`.
    pub async fn save(&mut self) -> Result<SaveReport> {
        let access = Arc::clone(&self.access);
        let scan = self.scanned().await?;

        let mut report = SaveReport::default();
        for category in scan.categories.iter_mut() {
            match category.save(access.as_ref()).await {
                Ok(()) => report.saved.push(category.name.clone()),
                Err(e) => {
                    warn!("Failed to save category {}: {}", category.name, e);
                    report.failed.push(CategorySaveFailure {
                        category: category.name.clone(),
                        error: e,
                    });
                }
            }
        }

        info!(
            "Saved {} categories ({} failed)",
            report.saved.len(),
            report.failed.len()
        );
        Ok(report)
    }

    async fn scanned(&mut self) -> Result<&mut ScanResult> {
        if self.scan.is_none() {
            let result = scan_catalog(&self.access, self.policy).await?;
            self.scan = Some(result);
        }
        self.scan
            .as_mut()
            .ok_or_else(|| IconError::Other("scan result missing".to_string()))
    }
}

async fn scan_catalog(access: &Arc<dyn FileAccess>, policy: ScanPolicy) -> Result<ScanResult> {
    info!("Scanning icon root {}", access.root().name());

    let files = collect_files(Arc::clone(access)).await?;
    let index = FileIndex::new(&files);

    let mut categories = Vec::new();
    let mut issues = ScanIssues::default();
    let mut skipped_folders = HashSet::new();

    for meta_file in files.iter().filter(|f| is_metadata_file(f)) {
        let bytes = meta_file.bytes(access.as_ref()).await?;
        let parsed = match parse_category_file(meta_file.relative_path(), bytes) {
            Ok(parsed) => parsed,
            Err(e) if policy == ScanPolicy::Lenient => {
                warn!("Skipping {}: {}", meta_file.relative_path(), e);
                issues.invalid_metadata.push(InvalidMetadata {
                    path: meta_file.relative_path().to_string(),
                    message: e.to_string(),
                });
                if let Some(parent) = meta_file.parent() {
                    skipped_folders.insert(parent.clone());
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(matched) = match_category(meta_file, parsed, &index) {
            issues.missing_files.extend(matched.missing);
            issues.duplicate_ids.extend(matched.duplicates);
            categories.push(matched.category);
        }
    }

    let orphans = classify_unmatched(&mut categories, &files, &skipped_folders);

    info!(
        "Scanned {} files: {} categories, {} orphan folders, {} missing icon files",
        files.len(),
        categories.len(),
        orphans.len(),
        issues.missing_files.len()
    );

    Ok(ScanResult {
        categories,
        orphans,
        issues,
    })
}
