//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use iconset_core::catalog::DuplicateIconId;
use iconset_core::enrichment::{enrich_new_icon, IconLookup, LookupCredentials};
use iconset_core::{
    Category, DiscoveredFile, IconFilesystem, LocalFileAccess, LookupConfig, MissingIconFile,
    NounProjectClient, PreferenceStore, RichIcon, SaveReport, ScanPolicy,
};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Flags shared by every catalog command.
pub struct Options {
    pub root: PathBuf,
    pub strict: bool,
    pub backup: bool,
}

impl Options {
    async fn open(&self) -> Result<IconFilesystem> {
        let access = LocalFileAccess::new(&self.root)
            .with_context(|| format!("Cannot open catalog root {}", self.root.display()))?
            .with_backups(self.backup);
        let policy = if self.strict {
            ScanPolicy::Strict
        } else {
            ScanPolicy::Lenient
        };
        Ok(IconFilesystem::open(Some(Arc::new(access)))
            .await?
            .with_policy(policy))
    }
}

#[derive(Debug, Serialize)]
struct CategorySummary {
    name: String,
    icons: usize,
    new_icons: Vec<String>,
}

#[derive(Debug, Serialize)]
struct OrphanSummary {
    folder: String,
    icons: Vec<String>,
}

#[derive(Debug, Serialize)]
struct InvalidSummary {
    path: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ScanSummary {
    categories: Vec<CategorySummary>,
    orphans: Vec<OrphanSummary>,
    missing_files: Vec<MissingIconFile>,
    invalid_metadata: Vec<InvalidSummary>,
    duplicate_ids: Vec<DuplicateIconId>,
}

async fn summarize(session: &mut IconFilesystem) -> Result<ScanSummary> {
    let categories = session
        .categories()
        .await?
        .iter()
        .map(|c| CategorySummary {
            name: c.name.clone(),
            icons: c.icons.len(),
            new_icons: c.new_icons.iter().map(|f| f.name().to_string()).collect(),
        })
        .collect();
    let orphans = session
        .orphans()
        .await?
        .iter()
        .map(|g| OrphanSummary {
            folder: g.category.clone(),
            icons: g.icons.clone(),
        })
        .collect();
    let issues = session.issues().await?;

    Ok(ScanSummary {
        categories,
        orphans,
        missing_files: issues.missing_files.clone(),
        invalid_metadata: issues
            .invalid_metadata
            .iter()
            .map(|i| InvalidSummary {
                path: i.path.clone(),
                message: i.message.clone(),
            })
            .collect(),
        duplicate_ids: issues.duplicate_ids.clone(),
    })
}

pub async fn scan(options: &Options, json: bool) -> Result<()> {
    let mut session = options.open().await?;
    let summary = summarize(&mut session).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for category in &summary.categories {
        println!(
            "{:<24} {:>4} icons {:>4} new",
            category.name,
            category.icons,
            category.new_icons.len()
        );
    }
    for orphan in &summary.orphans {
        println!("{:<24} no meta.json ({} icons)", orphan.folder, orphan.icons.len());
    }
    for missing in &summary.missing_files {
        println!("missing: {} ({})", missing.expected_path, missing.icon_id);
    }
    for invalid in &summary.invalid_metadata {
        println!("invalid: {}: {}", invalid.path, invalid.message);
    }
    for duplicate in &summary.duplicate_ids {
        println!("duplicate id: {} in {}", duplicate.id, duplicate.category);
    }
    Ok(())
}

/// Names of categories whose file differs from what a save would write.
async fn unnormalized(session: &mut IconFilesystem) -> Result<Vec<String>> {
    let access = Arc::clone(session.access());
    let mut names = Vec::new();
    for category in session.categories().await? {
        let on_disk = access.read_file(category.meta_file()).await?;
        if on_disk != category.render()?.as_bytes() {
            names.push(category.name.clone());
        }
    }
    Ok(names)
}

pub async fn status(options: &Options) -> Result<()> {
    let mut session = options.open().await?;
    let names = unnormalized(&mut session).await?;
    if names.is_empty() {
        println!("All categories are normalized");
    }
    for name in names {
        println!("needs normalize: {}", name);
    }
    Ok(())
}

fn check_report(report: &SaveReport) -> Result<()> {
    info!("Saved {} categories", report.saved.len());
    for failure in &report.failed {
        warn!("{}: {}", failure.category, failure.error);
    }
    if !report.is_complete() {
        bail!("{} categories could not be saved", report.failed.len());
    }
    Ok(())
}

pub async fn normalize(options: &Options) -> Result<()> {
    let mut session = options.open().await?;
    let report = session.save().await?;
    check_report(&report)
}

/// Move every new icon file into its category's icon list, enriched.
/// Returns how many icons were added.
async fn add_new_icons(
    session: &mut IconFilesystem,
    only: Option<&str>,
    credentials: &LookupCredentials,
    lookup: &dyn IconLookup,
) -> Result<usize> {
    let categories = session.categories_mut().await?;
    if let Some(name) = only {
        if !categories.iter().any(|c| c.name == name) {
            bail!("No category named {}", name);
        }
    }

    let mut added = 0;
    for category in categories.iter_mut() {
        if only.is_some_and(|name| name != category.name) {
            continue;
        }
        added += accept_new_icons(category, |file| async move {
            enrich_new_icon(&file, credentials, lookup).await
        })
        .await?;
    }
    Ok(added)
}

/// Push an icon built by `build` for each of the category's new icon files.
///
/// Files are taken off `new_icons` only once their icon is in place; on a
/// failed push the file and everything after it stay in `new_icons`.
async fn accept_new_icons<F, Fut>(category: &mut Category, mut build: F) -> Result<usize>
where
    F: FnMut(Arc<DiscoveredFile>) -> Fut,
    Fut: Future<Output = RichIcon>,
{
    let mut pending = std::mem::take(&mut category.new_icons).into_iter();
    let mut added = 0;
    while let Some(file) = pending.next() {
        let icon = build(Arc::clone(&file)).await;
        if let Err(e) = category.push_icon(icon) {
            category.new_icons.push(file);
            category.new_icons.extend(pending);
            return Err(e.into());
        }
        added += 1;
    }
    Ok(added)
}

fn lookup_setup() -> Result<(LookupCredentials, NounProjectClient)> {
    let credentials = PreferenceStore::open_default()?.credentials();
    if credentials.is_empty() {
        warn!("No lookup credentials stored; run `iconset auth` to set them");
    }
    let client = NounProjectClient::new(LookupConfig::from_env()?)?;
    Ok((credentials, client))
}

pub async fn add_new(options: &Options, only: Option<&str>) -> Result<()> {
    let (credentials, client) = lookup_setup()?;
    let mut session = options.open().await?;

    let added = add_new_icons(&mut session, only, &credentials, &client).await?;
    println!("Added {} icons", added);
    check_report(&session.save().await?)
}

/// Write an empty `meta.json` into the orphan folder named `folder`.
async fn create_category(session: &mut IconFilesystem, folder: &str) -> Result<Category> {
    let access = Arc::clone(session.access());
    let group = session
        .orphans()
        .await?
        .iter()
        .find(|g| g.category == folder)
        .cloned()
        .with_context(|| format!("No folder without meta.json named {}", folder))?;

    let mut category = Category::create(access.as_ref(), group.folder, group.category).await?;
    category.save(access.as_ref()).await?;
    Ok(category)
}

pub async fn adopt(options: &Options, folder: &str) -> Result<()> {
    let (credentials, client) = lookup_setup()?;

    let mut session = options.open().await?;
    create_category(&mut session, folder).await?;

    // Rescan so the folder's files show up as new icons of the new category.
    let mut session = options.open().await?;
    let added = add_new_icons(&mut session, Some(folder), &credentials, &client).await?;
    println!("Adopted {} with {} icons", folder, added);
    check_report(&session.save().await?)
}

pub fn auth(key: String, secret: String) -> Result<()> {
    let store = PreferenceStore::open_default()?;
    store.set_credentials(&LookupCredentials { key, secret })?;
    println!("Credentials stored in {}", store.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iconset_core::enrichment::LookupIcon;
    use std::fs;
    use tempfile::TempDir;

    struct NoLookup;

    #[async_trait::async_trait]
    impl IconLookup for NoLookup {
        async fn lookup(
            &self,
            tnp_id: &str,
            _credentials: &LookupCredentials,
        ) -> iconset_core::Result<LookupIcon> {
            Err(iconset_core::IconError::Lookup {
                id: tnp_id.to_string(),
                message: "offline".to_string(),
            })
        }
    }

    fn catalog() -> (TempDir, Options) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("icons");
        fs::create_dir_all(root.join("Flora")).unwrap();
        fs::create_dir_all(root.join("Birds")).unwrap();
        fs::write(
            root.join("Flora/meta.json"),
            r#"{"name":"Flora","icons":[{"id":"fern","url":"fern.svg","width":48,"height":48,"tnp_id":""}]}"#,
        )
        .unwrap();
        fs::write(root.join("Flora/fern.svg"), "<svg/>").unwrap();
        fs::write(root.join("Flora/noun_Koru_42.svg"), "<svg/>").unwrap();
        fs::write(root.join("Birds/kiwi.svg"), "<svg/>").unwrap();

        let options = Options {
            root,
            strict: false,
            backup: false,
        };
        (temp, options)
    }

    #[tokio::test]
    async fn test_summary() {
        let (_temp, options) = catalog();
        let mut session = options.open().await.unwrap();
        let summary = summarize(&mut session).await.unwrap();

        assert_eq!(summary.categories.len(), 1);
        assert_eq!(summary.categories[0].new_icons, vec!["noun_Koru_42.svg"]);
        assert_eq!(summary.orphans[0].folder, "Birds");
        assert!(summary.missing_files.is_empty());
    }

    #[tokio::test]
    async fn test_status_after_normalize() {
        let (_temp, options) = catalog();
        let mut session = options.open().await.unwrap();
        assert_eq!(unnormalized(&mut session).await.unwrap(), vec!["Flora"]);

        normalize(&options).await.unwrap();

        let mut session = options.open().await.unwrap();
        assert!(unnormalized(&mut session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_new_keeps_defaults_when_lookup_fails() {
        let (_temp, options) = catalog();
        let mut session = options.open().await.unwrap();

        let added = add_new_icons(&mut session, None, &LookupCredentials::default(), &NoLookup)
            .await
            .unwrap();
        assert_eq!(added, 1);

        let flora = &session.categories().await.unwrap()[0];
        assert!(flora.new_icons.is_empty());
        assert_eq!(flora.icons[1].icon.tnp_id, "42");
        assert_eq!(flora.icons[1].icon.term.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_failed_push_keeps_remaining_new_icons() {
        let (_temp, options) = catalog();
        fs::write(options.root.join("Flora/rata.svg"), "<svg/>").unwrap();
        let mut session = options.open().await.unwrap();
        let flora = &mut session.categories_mut().await.unwrap()[0];
        assert_eq!(flora.new_icons.len(), 2);

        // Every built icon reuses the id "fern", already in the category.
        let result = accept_new_icons(flora, |file| async move {
            let mut icon = iconset_core::enrichment::new_icon_from_file(&file);
            icon.icon.id = "fern".to_string();
            icon
        })
        .await;

        assert!(result.is_err());
        assert_eq!(flora.icons.len(), 1);
        assert!(flora.added().is_empty());
        let mut names: Vec<_> = flora.new_icons.iter().map(|f| f.name()).collect();
        names.sort();
        assert_eq!(names, vec!["noun_Koru_42.svg", "rata.svg"]);
    }

    #[tokio::test]
    async fn test_add_new_unknown_category() {
        let (_temp, options) = catalog();
        let mut session = options.open().await.unwrap();
        let result = add_new_icons(
            &mut session,
            Some("Fauna"),
            &LookupCredentials::default(),
            &NoLookup,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_adopt_creates_category() {
        let (_temp, options) = catalog();
        let mut session = options.open().await.unwrap();
        create_category(&mut session, "Birds").await.unwrap();
        assert!(options.root.join("Birds/meta.json").exists());

        let mut session = options.open().await.unwrap();
        let added = add_new_icons(
            &mut session,
            Some("Birds"),
            &LookupCredentials::default(),
            &NoLookup,
        )
        .await
        .unwrap();
        assert_eq!(added, 1);
        assert!(session.orphans().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adopt_unknown_folder() {
        let (_temp, options) = catalog();
        let mut session = options.open().await.unwrap();
        assert!(create_category(&mut session, "Flora").await.is_err());
    }
}
