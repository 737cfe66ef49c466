//! Iconset Core - catalog management for folders of SVG icons.
//!
//! A catalog root holds one folder per category. Each folder has a
//! `meta.json` describing its icons and the `.svg` files themselves. This
//! crate scans such a tree, reconciles the metadata against the files that
//! are actually there, tracks edits, and writes normalized metadata back.
//!
//! # Example
//!
//! ```rust,ignore
//! use iconset_core::IconFilesystem;
//!
//! #[tokio::main]
//! async fn main() -> iconset_core::Result<()> {
//!     let mut session = IconFilesystem::open_local("/path/to/icons").await?;
//!
//!     for category in session.categories().await? {
//!         println!("{}: {} icons", category.name, category.icons.len());
//!     }
//!     for group in session.orphans().await? {
//!         println!("{} has no meta.json", group.category);
//!     }
//!
//!     let report = session.save().await?;
//!     println!("Saved {} categories", report.saved.len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod fs_access;
pub mod naming;
pub mod preferences;
pub mod session;
pub mod walk;

pub use catalog::{Category, CategoryFile, Icon, MissingIconFile, OrphanGroup, RichIcon};
pub use config::LookupConfig;
pub use enrichment::{
    enrich_new_icon, IconLookup, LookupCredentials, LookupIcon, NounProjectClient,
};
pub use error::{IconError, Result};
pub use fs_access::{
    AccessMode, DirHandle, EntryHandle, FileAccess, FileHandle, LocalFileAccess,
    MemoryFileAccess, PermissionState,
};
pub use naming::{icon_class, icon_data_url};
pub use preferences::{PreferenceStore, Selection};
pub use session::{IconFilesystem, SaveReport, ScanIssues, ScanPolicy};
pub use walk::{walk_files, DiscoveredFile};
