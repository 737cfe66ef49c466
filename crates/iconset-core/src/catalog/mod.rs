//! Icon catalog: metadata records, categories, matching, and orphans.
//!
//! A category is a folder with a `meta.json` listing its icons. Scanning
//! matches each listed icon to the `.svg` file it names, then sorts the
//! remaining `.svg` files into new icons of known categories or orphan groups
//! for folders with no metadata yet.

mod beautify;
mod category;
mod icon;
mod matcher;
mod orphans;

pub use beautify::beautify;
pub use category::Category;
pub use icon::{CategoryFile, Icon, RichIcon};
pub use matcher::{
    folder_prefix, is_metadata_file, match_category, parse_category_file, DuplicateIconId,
    FileIndex, MatchedCategory, MissingIconFile,
};
pub use orphans::{classify_unmatched, OrphanGroup, OrphanTracker};
