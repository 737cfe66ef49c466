//! In-memory model of one category: its icons, pending edits, and save.

use super::beautify::beautify;
use super::icon::{CategoryDocument, RichIcon};
use crate::config::CatalogConfig;
use crate::error::{IconError, Result};
use crate::fs_access::{DirHandle, FileAccess, FileHandle};
use crate::walk::DiscoveredFile;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// One `meta.json` plus the folder it describes.
///
/// `icons` is the working list the caller edits. The baseline is the list as
/// of the last load or save; `changed()` and the `added`/`removed` trackers
/// are relative to it. Nothing reaches disk until `save`.
#[derive(Debug)]
pub struct Category {
    pub name: String,
    pub visible: Option<bool>,
    pub icons: Vec<RichIcon>,
    /// Icon files in this folder that the metadata does not describe yet.
    pub new_icons: Vec<Arc<DiscoveredFile>>,
    meta_file: FileHandle,
    folder: DirHandle,
    baseline: Vec<RichIcon>,
    added: Vec<RichIcon>,
    removed: Vec<RichIcon>,
}

impl Category {
    pub fn new(
        meta_file: FileHandle,
        folder: DirHandle,
        name: String,
        visible: Option<bool>,
        icons: Vec<RichIcon>,
    ) -> Self {
        Self {
            name,
            visible,
            baseline: icons.clone(),
            icons,
            new_icons: Vec::new(),
            meta_file,
            folder,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Create an empty category with a fresh `meta.json` in `folder`.
    ///
    /// The file is created empty; call `save` to write the document.
    pub async fn create(access: &dyn FileAccess, folder: DirHandle, name: String) -> Result<Self> {
        let meta_file = access
            .create_file(&folder, CatalogConfig::META_FILENAME)
            .await?;
        info!("Created {} in {}", CatalogConfig::META_FILENAME, folder.name());
        Ok(Self::new(meta_file, folder, name, None, Vec::new()))
    }

    pub fn meta_file(&self) -> &FileHandle {
        &self.meta_file
    }

    pub fn folder(&self) -> &DirHandle {
        &self.folder
    }

    /// Icons as of the last load or successful save.
    pub fn baseline(&self) -> &[RichIcon] {
        &self.baseline
    }

    pub fn added(&self) -> &[RichIcon] {
        &self.added
    }

    pub fn removed(&self) -> &[RichIcon] {
        &self.removed
    }

    pub fn icon(&self, id: &str) -> Option<&RichIcon> {
        self.icons.iter().find(|i| i.id() == id)
    }

    pub fn icon_mut(&mut self, id: &str) -> Option<&mut RichIcon> {
        self.icons.iter_mut().find(|i| i.id() == id)
    }

    pub fn is_removed(&self, icon: &RichIcon) -> bool {
        self.removed.contains(icon)
    }

    /// Record an addition. The caller places the icon in `icons`.
    pub fn add_icon(&mut self, icon: RichIcon) {
        self.added.push(icon);
    }

    /// Record an addition and append it to `icons`.
    ///
    /// Fails when another icon in the working list already uses the id.
    pub fn push_icon(&mut self, icon: RichIcon) -> Result<()> {
        if self.icon(icon.id()).is_some() {
            return Err(IconError::DuplicateIcon {
                category: self.name.clone(),
                id: icon.id().to_string(),
            });
        }
        self.icons.push(icon.clone());
        self.add_icon(icon);
        Ok(())
    }

    /// Record a removal. The caller strikes the icon from `icons`.
    pub fn remove_icon(&mut self, icon: RichIcon) {
        self.removed.push(icon);
    }

    /// Record the removal of the baseline icon with this id.
    pub fn remove_icon_by_id(&mut self, id: &str) -> Result<()> {
        let icon = self
            .baseline
            .iter()
            .find(|i| i.id() == id)
            .cloned()
            .ok_or_else(|| IconError::IconNotFound { id: id.to_string() })?;
        self.remove_icon(icon);
        Ok(())
    }

    /// Baseline icons whose working copy (same backing file) differs.
    ///
    /// Icons only in the baseline or only in the working list are not
    /// reported here; see `removed` and `added`.
    pub fn changed(&self) -> Vec<&RichIcon> {
        self.baseline
            .iter()
            .filter(|original| {
                self.icons
                    .iter()
                    .find(|current| current.same_file(original))
                    .is_some_and(|current| current.icon != original.icon)
            })
            .collect()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.changed().is_empty()
    }

    fn document(&self) -> CategoryDocument<'_> {
        CategoryDocument {
            name: &self.name,
            visible: self.visible,
            icons: self.icons.iter().map(|i| &i.icon).collect(),
        }
    }

    /// `{name, visible, icons}` with file links stripped.
    pub fn to_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.document())?)
    }

    /// The exact text `save` writes.
    pub fn render(&self) -> Result<String> {
        let value = self.to_document()?;
        Ok(beautify(
            &value,
            CatalogConfig::JSON_INDENT,
            CatalogConfig::JSON_WRAP_WIDTH,
        ))
    }

    /// Write the category to its `meta.json` and reset the baseline.
    ///
    /// On failure the baseline and trackers are left as they were.
    pub async fn save(&mut self, access: &dyn FileAccess) -> Result<()> {
        debug!(
            category = %self.name,
            added = self.added.len(),
            removed = self.removed.len(),
            changed = self.changed().len(),
            "Saving category"
        );

        let text = self.render()?;
        access.write_file(&self.meta_file, text.as_bytes()).await?;

        self.baseline = self.icons.clone();
        self.added.clear();
        self.removed.clear();
        debug!(category = %self.name, icons = self.icons.len(), "Saved category");
        Ok(())
    }
}
