//! Session tests over a real directory tree.

use futures::TryStreamExt;
use iconset_core::catalog::Category;
use iconset_core::enrichment::{enrich_new_icon, IconLookup, LookupCredentials, LookupIcon};
use iconset_core::{walk_files, IconError, IconFilesystem, LocalFileAccess, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const AOTEAROA_META: &str = r#"{
	"name": "Aotearoa",
	"icons": [
		{ "id": "kiwi", "url": "kiwi.svg", "width": 48, "height": 48, "tnp_id": "" },
		{ "id": "tui", "url": "tui.svg", "width": 48, "height": 48, "tnp_id": "", "source": "field notes" },
		{ "id": "moa", "url": "moa.svg", "width": 48, "height": 48, "tnp_id": "" }
	]
}"#;

/// `<temp>/icons` with one described folder and one undescribed one.
fn icon_tree() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("icons");
    write(&root.join("Aotearoa/meta.json"), AOTEAROA_META);
    write(&root.join("Aotearoa/kiwi.svg"), "<svg/>");
    write(&root.join("Aotearoa/tui.svg"), "<svg/>");
    write(&root.join("Aotearoa/noun_Beehive_12345.svg"), "<svg/>");
    write(&root.join("Birds/a.svg"), "<svg/>");
    write(&root.join("Birds/b.svg"), "<svg/>");
    write(&root.join("README.md"), "icons");
    (temp, root)
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

struct Beehive;

#[async_trait::async_trait]
impl IconLookup for Beehive {
    async fn lookup(&self, tnp_id: &str, _credentials: &LookupCredentials) -> Result<LookupIcon> {
        assert_eq!(tnp_id, "12345");
        Ok(serde_json::from_str(
            r#"{"term": "beehive", "tags": [{"slug": "nature"}], "collections": [{"name": "Flora"}]}"#,
        )
        .unwrap())
    }
}

#[tokio::test]
async fn test_walk_yields_every_file_once() {
    let (_temp, root) = icon_tree();
    let access = Arc::new(LocalFileAccess::new(&root).unwrap());

    let files: Vec<_> = walk_files(access).try_collect().await.unwrap();
    let mut paths: Vec<_> = files.iter().map(|f| f.relative_path().to_string()).collect();
    paths.sort();

    assert_eq!(
        paths,
        vec![
            "icons/Aotearoa/kiwi.svg",
            "icons/Aotearoa/meta.json",
            "icons/Aotearoa/noun_Beehive_12345.svg",
            "icons/Aotearoa/tui.svg",
            "icons/Birds/a.svg",
            "icons/Birds/b.svg",
            "icons/README.md",
        ]
    );
}

#[tokio::test]
async fn test_open_missing_directory() {
    let temp = TempDir::new().unwrap();
    let err = IconFilesystem::open_local(temp.path().join("nope"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, IconError::FileNotFound(_)));
}

#[tokio::test]
async fn test_missing_files_are_dropped_and_reported() {
    let (_temp, root) = icon_tree();
    let mut session = IconFilesystem::open_local(&root).await.unwrap();

    let categories = session.categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    let ids: Vec<_> = categories[0].icons.iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["kiwi", "tui"]);

    let issues = session.issues().await.unwrap();
    assert_eq!(issues.missing_files.len(), 1);
    assert_eq!(issues.missing_files[0].icon_id, "moa");
    assert_eq!(issues.missing_files[0].expected_path, "icons/Aotearoa/moa.svg");
}

#[tokio::test]
async fn test_new_icons_and_orphans() {
    let (_temp, root) = icon_tree();
    let mut session = IconFilesystem::open_local(&root).await.unwrap();

    let categories = session.categories().await.unwrap();
    let new_names: Vec<_> = categories[0].new_icons.iter().map(|f| f.name()).collect();
    assert_eq!(new_names, vec!["noun_Beehive_12345.svg"]);

    let orphans = session.orphans().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].category, "Birds");
    assert_eq!(orphans[0].icons, vec!["a.svg", "b.svg"]);
}

#[tokio::test]
async fn test_unchanged_save_is_stable() {
    let (_temp, root) = icon_tree();
    let meta = root.join("Aotearoa/meta.json");

    let mut session = IconFilesystem::open_local(&root).await.unwrap();
    {
        let category = &session.categories().await.unwrap()[0];
        assert!(category.changed().is_empty());
        assert!(category.added().is_empty());
        assert!(category.removed().is_empty());
    }
    assert!(session.save().await.unwrap().is_complete());
    let first = fs::read(&meta).unwrap();

    session.save().await.unwrap();
    assert_eq!(fs::read(&meta).unwrap(), first);

    // A fresh scan of the saved file renders the same bytes.
    let mut reopened = IconFilesystem::open_local(&root).await.unwrap();
    let rendered = reopened.categories().await.unwrap()[0].render().unwrap();
    assert_eq!(rendered.as_bytes(), first.as_slice());
}

#[tokio::test]
async fn test_width_change_is_tracked_and_saved() {
    let (_temp, root) = icon_tree();
    let mut session = IconFilesystem::open_local(&root).await.unwrap();

    let category = &mut session.categories_mut().await.unwrap()[0];
    category.icon_mut("kiwi").unwrap().icon.width = 96.into();

    let changed: Vec<_> = category.changed().iter().map(|i| i.id().to_string()).collect();
    assert_eq!(changed, vec!["kiwi"]);

    session.save().await.unwrap();
    let category = &session.categories().await.unwrap()[0];
    assert!(category.changed().is_empty());
    assert_eq!(category.baseline()[0].icon.width.as_u64(), Some(96));

    let mut reopened = IconFilesystem::open_local(&root).await.unwrap();
    let kiwi = reopened.categories().await.unwrap()[0].icon("kiwi").unwrap().icon.clone();
    assert_eq!(kiwi.width.as_u64(), Some(96));
}

#[tokio::test]
async fn test_unknown_fields_survive_save() {
    let (_temp, root) = icon_tree();
    let mut session = IconFilesystem::open_local(&root).await.unwrap();
    session.save().await.unwrap();

    let text = fs::read_to_string(root.join("Aotearoa/meta.json")).unwrap();
    assert!(text.contains(r#""source": "field notes""#));
    assert!(!text.contains("moa"));
    assert!(text.starts_with("{\n\t\"name\": \"Aotearoa\""));
}

#[tokio::test]
async fn test_add_enriched_new_icon() {
    let (_temp, root) = icon_tree();
    let mut session = IconFilesystem::open_local(&root).await.unwrap();

    let category = &mut session.categories_mut().await.unwrap()[0];
    let file = Arc::clone(&category.new_icons[0]);
    let icon = enrich_new_icon(&file, &LookupCredentials::default(), &Beehive).await;
    category.push_icon(icon).unwrap();
    assert_eq!(category.added().len(), 1);

    session.save().await.unwrap();

    let mut reopened = IconFilesystem::open_local(&root).await.unwrap();
    let category = &reopened.categories().await.unwrap()[0];
    assert_eq!(category.icons.len(), 3);
    assert!(category.new_icons.is_empty());

    let beehive = &category.icons[2].icon;
    assert_eq!(beehive.url, "noun_Beehive_12345.svg");
    assert_eq!(beehive.tnp_id, "12345");
    assert_eq!(beehive.term.as_deref(), Some("beehive"));
    assert_eq!(beehive.tags, Some(vec!["nature".to_string()]));
    assert_eq!(beehive.collections, Some(vec!["Flora".to_string()]));
}

#[tokio::test]
async fn test_adopt_orphan_group() {
    let (_temp, root) = icon_tree();
    let mut session = IconFilesystem::open_local(&root).await.unwrap();

    let access = Arc::clone(session.access());
    let group = session.orphans().await.unwrap()[0].clone();
    let mut category = Category::create(access.as_ref(), group.folder, group.category)
        .await
        .unwrap();
    category.save(access.as_ref()).await.unwrap();

    let mut reopened = IconFilesystem::open_local(&root).await.unwrap();
    assert!(reopened.orphans().await.unwrap().is_empty());
    let birds = reopened
        .categories()
        .await
        .unwrap()
        .iter()
        .find(|c| c.name == "Birds")
        .unwrap();
    assert!(birds.icons.is_empty());
    assert_eq!(birds.new_icons.len(), 2);
}
