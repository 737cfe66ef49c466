//! Persisted user preferences.
//!
//! A small JSON key/value file holding the lookup credentials and the last
//! selected category and icon. Entries are independent; a missing entry
//! reads as its default.

use crate::config::PathsConfig;
use crate::enrichment::LookupCredentials;
use crate::error::{IconError, Result};
use crate::fs_access::{atomic_read_json, atomic_write_json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CREDENTIALS_KEY: &str = "nounProjectAuth";
pub const CHOSEN_CATEGORY_KEY: &str = "chosenCategory";
pub const CHOSEN_ICON_KEY: &str = "chosenIcon";

/// Last UI selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub category: usize,
    pub icon: Option<String>,
}

/// JSON-file backed key/value store.
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's config directory.
    pub fn open_default() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| IconError::Config {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(Self::new(
            config_dir
                .join(PathsConfig::CONFIG_DIR_NAME)
                .join(PathsConfig::PREFERENCES_FILENAME),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        Ok(atomic_read_json(&self.path)?.unwrap_or_default())
    }

    /// Read one entry. `None` when absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load()?.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Write one entry, keeping the others.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        atomic_write_json(&self.path, &entries, false)?;

        // Holds API credentials.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| IconError::io_with_path(e, &self.path))?;
        }

        debug!("Stored preference {} in {}", key, self.path.display());
        Ok(())
    }

    /// Lookup credentials; empty key and secret when unset or unreadable.
    pub fn credentials(&self) -> LookupCredentials {
        self.get_or_default(CREDENTIALS_KEY)
    }

    pub fn set_credentials(&self, credentials: &LookupCredentials) -> Result<()> {
        self.set(CREDENTIALS_KEY, credentials)
    }

    pub fn selection(&self) -> Selection {
        Selection {
            category: self.get_or_default(CHOSEN_CATEGORY_KEY),
            icon: self.get_or_default(CHOSEN_ICON_KEY),
        }
    }

    pub fn set_selection(&self, selection: &Selection) -> Result<()> {
        self.set(CHOSEN_CATEGORY_KEY, &selection.category)?;
        self.set(CHOSEN_ICON_KEY, &selection.icon)
    }

    fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring unreadable preference {}: {}", key, e);
                T::default()
            }
        }
    }
}
