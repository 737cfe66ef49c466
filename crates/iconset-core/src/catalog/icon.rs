//! Icon and category records as stored in `meta.json`.

use crate::walk::DiscoveredFile;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::sync::Arc;

/// One icon's metadata record.
///
/// Saving normalizes each record: known fields are written in the order
/// declared here whatever their order in the file, `tnp_id` is always
/// written (empty when absent), and fields this type does not know about are
/// kept in `extra` and written after the known ones, in file order.
///
/// `width` and `height` are kept as JSON numbers so fractional or negative
/// sizes load and are written back as they were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ligature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub width: Number,
    pub height: Number,
    #[serde(default)]
    pub tnp_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed content of a `meta.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub icons: Vec<Icon>,
}

/// What gets written back: the name is always resolved by then.
#[derive(Debug, Serialize)]
pub(crate) struct CategoryDocument<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    pub icons: Vec<&'a Icon>,
}

/// An icon linked to the file backing it.
///
/// The link is derived at load time and never serialized.
#[derive(Debug, Clone)]
pub struct RichIcon {
    pub icon: Icon,
    pub file: Arc<DiscoveredFile>,
}

impl RichIcon {
    pub fn new(icon: Icon, file: Arc<DiscoveredFile>) -> Self {
        Self { icon, file }
    }

    pub fn id(&self) -> &str {
        &self.icon.id
    }

    /// Whether both icons are backed by the same file.
    pub fn same_file(&self, other: &RichIcon) -> bool {
        self.file.relative_path() == other.file.relative_path()
    }
}

/// Identity is the icon id plus its backing file.
impl PartialEq for RichIcon {
    fn eq(&self, other: &Self) -> bool {
        self.icon.id == other.icon.id && self.same_file(other)
    }
}
