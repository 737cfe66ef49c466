//! Parse `meta.json` files and match their icons to discovered files.

use super::category::Category;
use super::icon::{CategoryFile, RichIcon};
use crate::config::CatalogConfig;
use crate::error::{IconError, Result};
use crate::walk::DiscoveredFile;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// A declared icon whose file was not found on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingIconFile {
    pub category: String,
    pub icon_id: String,
    pub url: String,
    pub expected_path: String,
}

/// An icon id declared more than once in one metadata file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateIconId {
    pub category: String,
    pub id: String,
}

/// Lookup of discovered files by relative path.
pub struct FileIndex<'a> {
    by_path: HashMap<&'a str, &'a Arc<DiscoveredFile>>,
}

impl<'a> FileIndex<'a> {
    pub fn new(files: &'a [Arc<DiscoveredFile>]) -> Self {
        Self {
            by_path: files.iter().map(|f| (f.relative_path(), f)).collect(),
        }
    }

    pub fn get(&self, relative_path: &str) -> Option<&'a Arc<DiscoveredFile>> {
        self.by_path.get(relative_path).copied()
    }
}

pub fn is_metadata_file(file: &DiscoveredFile) -> bool {
    file.name() == CatalogConfig::META_FILENAME
}

/// `icons/Aotearoa/meta.json` -> `icons/Aotearoa/`.
pub fn folder_prefix(meta_relative_path: &str) -> &str {
    meta_relative_path
        .strip_suffix(CatalogConfig::META_FILENAME)
        .unwrap_or(meta_relative_path)
}

/// Parse the content of a metadata file.
///
/// Malformed JSON is returned as `IconError::MetadataParse`; whether that
/// aborts a scan is the caller's decision.
pub fn parse_category_file(relative_path: &str, bytes: &[u8]) -> Result<CategoryFile> {
    serde_json::from_slice(bytes).map_err(|e| IconError::metadata_parse(relative_path, e))
}

/// A category built from one metadata file, plus what was wrong with it.
#[derive(Debug)]
pub struct MatchedCategory {
    pub category: Category,
    pub missing: Vec<MissingIconFile>,
    /// Ids used by more than one matched icon, once each.
    pub duplicates: Vec<DuplicateIconId>,
}

/// Resolve each declared icon against `<folder prefix><url>`.
///
/// Icons whose file is missing are dropped with a warning. Returns `None`
/// for a metadata file without a parent folder.
pub fn match_category(
    meta_file: &DiscoveredFile,
    parsed: CategoryFile,
    index: &FileIndex<'_>,
) -> Option<MatchedCategory> {
    let folder = meta_file.parent()?.clone();
    let name = parsed
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| folder.name().to_string());
    let prefix = folder_prefix(meta_file.relative_path());

    let mut icons = Vec::with_capacity(parsed.icons.len());
    let mut missing = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut duplicates: Vec<DuplicateIconId> = Vec::new();

    for icon in parsed.icons {
        let expected_path = format!("{}{}", prefix, icon.url);
        let Some(file) = index.get(&expected_path) else {
            warn!("No file found for {} (category {})", icon.url, name);
            missing.push(MissingIconFile {
                category: name.clone(),
                icon_id: icon.id,
                url: icon.url,
                expected_path,
            });
            continue;
        };

        if !seen_ids.insert(icon.id.clone()) && !duplicates.iter().any(|d| d.id == icon.id) {
            warn!("Duplicate icon id {} in category {}", icon.id, name);
            duplicates.push(DuplicateIconId {
                category: name.clone(),
                id: icon.id.clone(),
            });
        }
        icons.push(RichIcon::new(icon, Arc::clone(file)));
    }

    let category = Category::new(
        meta_file.handle().clone(),
        folder,
        name,
        parsed.visible,
        icons,
    );
    Some(MatchedCategory {
        category,
        missing,
        duplicates,
    })
}
