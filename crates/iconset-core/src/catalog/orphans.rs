//! Classification of icon files the metadata does not describe.

use super::category::Category;
use crate::config::CatalogConfig;
use crate::fs_access::DirHandle;
use crate::walk::DiscoveredFile;
use std::collections::HashSet;
use std::sync::Arc;

/// A folder holding icon files but no metadata file.
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanGroup {
    /// The folder's name.
    pub category: String,
    pub folder: DirHandle,
    /// Bare filenames, in discovery order.
    pub icons: Vec<String>,
}

/// Accumulates orphan filenames, one group per folder.
#[derive(Debug, Default)]
pub struct OrphanTracker {
    groups: Vec<OrphanGroup>,
}

impl OrphanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `filename` to the group for `folder`, creating it on first sight.
    pub fn record(&mut self, folder: &DirHandle, filename: &str) {
        match self.groups.iter_mut().find(|g| &g.folder == folder) {
            Some(group) => group.icons.push(filename.to_string()),
            None => self.groups.push(OrphanGroup {
                category: folder.name().to_string(),
                folder: folder.clone(),
                icons: vec![filename.to_string()],
            }),
        }
    }

    pub fn groups(&self) -> &[OrphanGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<OrphanGroup> {
        self.groups
    }
}

/// Sort every unmatched icon file into its category's `new_icons` or into an
/// orphan group.
///
/// A file already backing a matched icon is skipped wherever it lives, so an
/// icon declared with a nested url (`sub/c.svg`) never also shows up under
/// its own folder.
///
/// Files in `skipped_folders` (folders whose metadata failed to parse) are
/// left out entirely.
pub fn classify_unmatched(
    categories: &mut [Category],
    files: &[Arc<DiscoveredFile>],
    skipped_folders: &HashSet<DirHandle>,
) -> Vec<OrphanGroup> {
    let mut tracker = OrphanTracker::new();
    let matched: HashSet<String> = categories
        .iter()
        .flat_map(|c| c.icons.iter())
        .map(|icon| icon.file.relative_path().to_string())
        .collect();

    for file in files {
        if !file.has_extension(CatalogConfig::ICON_EXTENSION) {
            continue;
        }
        let Some(parent) = file.parent() else {
            continue;
        };
        if skipped_folders.contains(parent) || matched.contains(file.relative_path()) {
            continue;
        }

        match categories.iter_mut().find(|c| c.folder() == parent) {
            Some(category) => category.new_icons.push(Arc::clone(file)),
            None => tracker.record(parent, file.name()),
        }
    }

    tracker.into_groups()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::icon::{Icon, RichIcon};
    use crate::fs_access::FileHandle;

    fn dir(name: &str) -> DirHandle {
        DirHandle::new(name, format!("icons/{}", name))
    }

    fn file(folder: &str, name: &str) -> Arc<DiscoveredFile> {
        Arc::new(DiscoveredFile::new(
            format!("icons/{}/{}", folder, name),
            Some(dir(folder)),
            FileHandle::new(name, format!("icons/{}/{}", folder, name)),
        ))
    }

    fn category_with(folder: &str, matched: &Arc<DiscoveredFile>) -> Category {
        let icon = Icon {
            id: "one".to_string(),
            ligature: None,
            name: None,
            url: matched.name().to_string(),
            title: None,
            width: 48.into(),
            height: 48.into(),
            tnp_id: String::new(),
            tags: None,
            term: None,
            collections: None,
            extra: Default::default(),
        };
        Category::new(
            FileHandle::new("meta.json", format!("icons/{}/meta.json", folder)),
            dir(folder),
            folder.to_string(),
            None,
            vec![RichIcon::new(icon, Arc::clone(matched))],
        )
    }

    #[test]
    fn test_uncategorized_folder_becomes_one_group() {
        let files = vec![file("Birds", "iconsA.svg"), file("Birds", "iconsB.svg")];
        let mut categories = Vec::new();

        let orphans = classify_unmatched(&mut categories, &files, &HashSet::new());

        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].category, "Birds");
        assert_eq!(orphans[0].icons, vec!["iconsA.svg", "iconsB.svg"]);
    }

    #[test]
    fn test_extra_svg_in_category_is_new_icon() {
        let matched = file("Flora", "fern.svg");
        let extra = file("Flora", "rata.svg");
        let files = vec![
            file("Flora", "meta.json"),
            Arc::clone(&matched),
            Arc::clone(&extra),
        ];
        let mut categories = vec![category_with("Flora", &matched)];

        let orphans = classify_unmatched(&mut categories, &files, &HashSet::new());

        assert!(orphans.is_empty());
        assert_eq!(categories[0].icons.len(), 1);
        assert_eq!(categories[0].new_icons.len(), 1);
        assert_eq!(categories[0].new_icons[0].name(), "rata.svg");
    }

    #[test]
    fn test_nested_url_match_is_not_an_orphan() {
        let nested = Arc::new(DiscoveredFile::new(
            "icons/Flora/sub/c.svg".to_string(),
            Some(DirHandle::new("sub", "icons/Flora/sub")),
            FileHandle::new("c.svg", "icons/Flora/sub/c.svg"),
        ));
        let stray = Arc::new(DiscoveredFile::new(
            "icons/Flora/sub/d.svg".to_string(),
            Some(DirHandle::new("sub", "icons/Flora/sub")),
            FileHandle::new("d.svg", "icons/Flora/sub/d.svg"),
        ));
        let files = vec![Arc::clone(&nested), Arc::clone(&stray)];
        let mut categories = vec![category_with("Flora", &nested)];

        let orphans = classify_unmatched(&mut categories, &files, &HashSet::new());

        assert!(categories[0].new_icons.is_empty());
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].category, "sub");
        assert_eq!(orphans[0].icons, vec!["d.svg"]);
    }

    #[test]
    fn test_non_icon_files_and_skipped_folders_ignored() {
        let files = vec![
            file("Birds", "notes.txt"),
            file("Broken", "kiwi.svg"),
            Arc::new(DiscoveredFile::new(
                "loose.svg".to_string(),
                None,
                FileHandle::new("loose.svg", "loose.svg"),
            )),
        ];
        let skipped: HashSet<_> = [dir("Broken")].into_iter().collect();

        let orphans = classify_unmatched(&mut [], &files, &skipped);
        assert!(orphans.is_empty());
    }

    #[test]
    fn test_tracker_groups_by_folder_identity() {
        let mut tracker = OrphanTracker::new();
        tracker.record(&dir("Birds"), "a.svg");
        tracker.record(&DirHandle::new("Birds", "other/Birds"), "b.svg");
        tracker.record(&dir("Birds"), "c.svg");

        let groups = tracker.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].icons, vec!["a.svg", "c.svg"]);
    }
}
