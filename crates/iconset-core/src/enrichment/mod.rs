//! Metadata for newly found icon files.
//!
//! A new icon gets local defaults derived from its filename, then tags, term
//! and collections from an external lookup keyed by the Noun Project id
//! embedded in names like `noun_Beehive_147848.svg`.

mod client;

pub use client::NounProjectClient;

use crate::catalog::{Icon, RichIcon};
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::walk::DiscoveredFile;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

static NOUN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"noun[_-][\w\d_-]+[_-](\d+)").expect("noun id regex must compile"));

/// Key/secret pair passed to the lookup service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupCredentials {
    pub key: String,
    pub secret: String,
}

impl LookupCredentials {
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.secret.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LookupTag {
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LookupCollection {
    pub name: String,
}

/// Descriptive data returned for one icon.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LookupIcon {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub tags: Vec<LookupTag>,
    #[serde(default)]
    pub collections: Vec<LookupCollection>,
}

/// Source of enrichment data.
#[async_trait]
pub trait IconLookup: Send + Sync {
    async fn lookup(&self, tnp_id: &str, credentials: &LookupCredentials) -> Result<LookupIcon>;
}

/// Extract the Noun Project id from a filename, or an empty string.
pub fn extract_tnp_id(filename: &str) -> String {
    NOUN_ID
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// An icon for `file` with defaults derived from its name.
pub fn new_icon_from_file(file: &Arc<DiscoveredFile>) -> RichIcon {
    let stem = file
        .name()
        .strip_suffix(CatalogConfig::ICON_EXTENSION)
        .unwrap_or(file.name())
        .to_string();

    let icon = Icon {
        id: uuid::Uuid::new_v4().simple().to_string(),
        ligature: Some(stem.clone()),
        name: Some(stem),
        url: file.name().to_string(),
        title: None,
        width: CatalogConfig::DEFAULT_ICON_WIDTH.into(),
        height: CatalogConfig::DEFAULT_ICON_HEIGHT.into(),
        tnp_id: extract_tnp_id(file.name()),
        tags: Some(Vec::new()),
        term: Some(String::new()),
        collections: Some(Vec::new()),
        extra: Default::default(),
    };
    RichIcon::new(icon, Arc::clone(file))
}

/// Fold lookup data into `icon` without discarding what it already has.
///
/// Title and term are only filled when empty; tags and collections are
/// merged as an order-preserving set union.
pub fn merge_lookup(icon: &mut Icon, found: &LookupIcon) {
    if icon.title.as_deref().map_or(true, str::is_empty) {
        icon.title = Some(found.term.clone());
    }
    if icon.term.as_deref().map_or(true, str::is_empty) {
        icon.term = Some(found.term.clone());
    }

    let tags = found.tags.iter().map(|t| t.slug.clone());
    icon.tags = Some(union(icon.tags.take().unwrap_or_default(), tags));

    let collections = found.collections.iter().map(|c| c.name.clone());
    icon.collections = Some(union(icon.collections.take().unwrap_or_default(), collections));
}

fn union(existing: Vec<String>, incoming: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    existing
        .into_iter()
        .chain(incoming)
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Build a new icon for `file` and enrich it through `lookup`.
///
/// Lookup failures are logged and the icon keeps its local defaults.
pub async fn enrich_new_icon(
    file: &Arc<DiscoveredFile>,
    credentials: &LookupCredentials,
    lookup: &dyn IconLookup,
) -> RichIcon {
    let mut rich = new_icon_from_file(file);
    enrich_icon(&mut rich.icon, credentials, lookup).await;
    rich
}

/// Enrich an existing icon in place. Returns whether lookup data was merged.
pub async fn enrich_icon(
    icon: &mut Icon,
    credentials: &LookupCredentials,
    lookup: &dyn IconLookup,
) -> bool {
    if icon.tnp_id.is_empty() {
        debug!("No lookup id for {}, keeping defaults", icon.url);
        return false;
    }

    match lookup.lookup(&icon.tnp_id, credentials).await {
        Ok(found) => {
            merge_lookup(icon, &found);
            true
        }
        Err(e) => {
            warn!(
                "Icon lookup failed for {} (id {}); check the API credentials and id: {}",
                icon.url, icon.tnp_id, e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IconError;
    use crate::fs_access::{DirHandle, FileHandle};

    struct FixedLookup(Option<LookupIcon>);

    #[async_trait]
    impl IconLookup for FixedLookup {
        async fn lookup(&self, tnp_id: &str, _credentials: &LookupCredentials) -> Result<LookupIcon> {
            self.0.clone().ok_or_else(|| IconError::Lookup {
                id: tnp_id.to_string(),
                message: "unauthorized".to_string(),
            })
        }
    }

    fn beehive() -> LookupIcon {
        LookupIcon {
            term: "beehive".to_string(),
            tags: vec![LookupTag {
                slug: "nature".to_string(),
            }],
            collections: vec![LookupCollection {
                name: "Flora".to_string(),
            }],
        }
    }

    fn svg(name: &str) -> Arc<DiscoveredFile> {
        Arc::new(DiscoveredFile::new(
            format!("icons/Aotearoa/{}", name),
            Some(DirHandle::new("Aotearoa", "icons/Aotearoa")),
            FileHandle::new(name, format!("icons/Aotearoa/{}", name)),
        ))
    }

    #[test]
    fn test_extract_tnp_id() {
        assert_eq!(extract_tnp_id("noun_Beehive_147848.svg"), "147848");
        assert_eq!(extract_tnp_id("noun-bee-hive-12345.svg"), "12345");
        assert_eq!(extract_tnp_id("kiwi.svg"), "");
    }

    #[test]
    fn test_new_icon_defaults() {
        let rich = new_icon_from_file(&svg("noun_Beehive_12345.svg"));
        let icon = &rich.icon;
        assert_eq!(icon.url, "noun_Beehive_12345.svg");
        assert_eq!(icon.name.as_deref(), Some("noun_Beehive_12345"));
        assert_eq!(icon.ligature.as_deref(), Some("noun_Beehive_12345"));
        assert_eq!(icon.width.as_u64(), Some(48));
        assert_eq!(icon.height.as_u64(), Some(48));
        assert_eq!(icon.tnp_id, "12345");
        assert!(!icon.id.is_empty());

        let other = new_icon_from_file(&svg("noun_Beehive_12345.svg"));
        assert_ne!(icon.id, other.icon.id);
    }

    #[tokio::test]
    async fn test_enrich_merges_lookup() {
        let lookup = FixedLookup(Some(beehive()));
        let rich = enrich_new_icon(
            &svg("noun_Beehive_12345.svg"),
            &LookupCredentials::default(),
            &lookup,
        )
        .await;

        assert_eq!(rich.icon.term.as_deref(), Some("beehive"));
        assert_eq!(rich.icon.title.as_deref(), Some("beehive"));
        assert_eq!(rich.icon.tags, Some(vec!["nature".to_string()]));
        assert_eq!(rich.icon.collections, Some(vec!["Flora".to_string()]));
    }

    #[test]
    fn test_merge_is_set_union() {
        let mut icon = new_icon_from_file(&svg("noun_Beehive_12345.svg")).icon;
        icon.tags = Some(vec!["bee".to_string(), "nature".to_string()]);
        icon.collections = None;
        icon.title = Some("Hive".to_string());

        merge_lookup(&mut icon, &beehive());

        assert_eq!(
            icon.tags,
            Some(vec!["bee".to_string(), "nature".to_string()])
        );
        assert_eq!(icon.collections, Some(vec!["Flora".to_string()]));
        assert_eq!(icon.title.as_deref(), Some("Hive"));
    }

    #[tokio::test]
    async fn test_lookup_error_keeps_defaults() {
        let lookup = FixedLookup(None);
        let rich = enrich_new_icon(
            &svg("noun_Beehive_12345.svg"),
            &LookupCredentials::default(),
            &lookup,
        )
        .await;

        assert_eq!(rich.icon.term.as_deref(), Some(""));
        assert_eq!(rich.icon.tags, Some(vec![]));
        assert!(rich.icon.title.is_none());
    }

    #[tokio::test]
    async fn test_no_id_skips_lookup() {
        let lookup = FixedLookup(Some(beehive()));
        let rich = enrich_new_icon(&svg("kiwi.svg"), &LookupCredentials::default(), &lookup).await;
        assert_eq!(rich.icon.term.as_deref(), Some(""));
    }
}
