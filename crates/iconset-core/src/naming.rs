//! Display helpers for icons: CSS class names and inline data URLs.

use crate::catalog::RichIcon;
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::fs_access::FileAccess;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s").expect("whitespace regex must compile"));

/// CSS class name for an icon url.
///
/// Drops the `.svg` extension, turns each whitespace character into `-`, and
/// joins path segments with `--`: `"Native Birds/kiwi bird.svg"` becomes
/// `"Native-Birds--kiwi-bird"`. Empty segments are kept, so `"/lead.svg"`
/// becomes `"--lead"`.
pub fn icon_class(url: &str) -> String {
    let stem = url
        .strip_suffix(CatalogConfig::ICON_EXTENSION)
        .unwrap_or(url);
    WHITESPACE.replace_all(stem, "-").split('/').collect::<Vec<_>>().join("--")
}

/// `data:` URL for raw SVG bytes.
pub fn icon_data_url(svg: &[u8]) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// `data:` URL for an icon's backing file, read through `access`.
pub async fn rich_icon_data_url(icon: &RichIcon, access: &dyn FileAccess) -> Result<String> {
    let bytes = icon.file.bytes(access).await?;
    Ok(icon_data_url(bytes))
}
