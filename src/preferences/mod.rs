// SPDX-License-Identifier: MIT

//! Preference store backends for the `com.apple.ncprefs` domain.
//!
//! This module hides where the domain actually lives:
//! - [`CfStore`] goes through CFPreferences (macOS only), so `cfprefsd` sees
//!   the write immediately.
//! - [`PlistFileStore`] edits a property list file directly, used with
//!   `--plist` and on hosts without CoreFoundation.
//! - [`MemoryStore`] keeps everything in a dictionary for tests.
//!
//! No Notification Center semantics are applied here; values are opaque
//! `plist::Value`s addressed by top-level key.

mod file;

use std::path::PathBuf;

use anyhow::Result;
use plist::{Dictionary, Value};

pub use file::PlistFileStore;

/// Domain owned by the Notification Center preference pane.
pub const NCPREFS_DOMAIN: &str = "com.apple.ncprefs";

/// Key holding the per-app record array.
pub const APPS_KEY: &str = "apps";

/// Key holding the global "Show previews" setting.
pub const GLOBAL_CONTENT_VISIBILITY_KEY: &str = "content_visibility";

/// Key/value access to one preferences domain.
pub trait PrefStore {
    /// Returns `Ok(None)` when the key is not defined.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Human-readable location, used in error messages and traces.
    fn location(&self) -> String;
}

/// `~/Library/Preferences/com.apple.ncprefs.plist`.
pub fn default_plist_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Unable to determine the home directory"))?;
    Ok(home
        .join("Library/Preferences")
        .join(format!("{NCPREFS_DOMAIN}.plist")))
}

/// Picks the backend: an explicit plist path wins, then CFPreferences where
/// available, then the user's plist file.
pub fn open_store(plist: Option<PathBuf>) -> Result<Box<dyn PrefStore>> {
    match plist {
        Some(path) => Ok(Box::new(PlistFileStore::new(path))),
        None => platform_store(),
    }
}

#[cfg(target_os = "macos")]
fn platform_store() -> Result<Box<dyn PrefStore>> {
    Ok(Box::new(CfStore::new(NCPREFS_DOMAIN)))
}

#[cfg(not(target_os = "macos"))]
fn platform_store() -> Result<Box<dyn PrefStore>> {
    Ok(Box::new(PlistFileStore::new(default_plist_path()?)))
}

/// CFPreferences-backed store for the current user, any host.
#[cfg(target_os = "macos")]
pub struct CfStore {
    domain: String,
}

#[cfg(target_os = "macos")]
impl CfStore {
    pub fn new(domain: &str) -> Self {
        CfStore {
            domain: domain.to_string(),
        }
    }
}

#[cfg(target_os = "macos")]
impl PrefStore for CfStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        crate::core::foundation::read_pref(&self.domain, key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        crate::core::foundation::write_pref(&self.domain, key, &value)
    }

    fn location(&self) -> String {
        self.domain.clone()
    }
}

/// In-memory store; counts writes so callers can assert on batching.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Dictionary,
    writes: usize,
}

impl MemoryStore {
    pub fn new(values: Dictionary) -> Self {
        MemoryStore { values, writes: 0 }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn values(&self) -> &Dictionary {
        &self.values
    }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_reads_back_and_counts_writes() -> Result<()> {
        let mut store = MemoryStore::default();
        assert_eq!(store.get(APPS_KEY)?, None);

        store.set(GLOBAL_CONTENT_VISIBILITY_KEY, Value::Integer(2.into()))?;
        assert_eq!(
            store
                .get(GLOBAL_CONTENT_VISIBILITY_KEY)?
                .and_then(|v| v.as_signed_integer()),
            Some(2)
        );
        assert_eq!(store.writes(), 1);
        Ok(())
    }

    #[test]
    fn explicit_path_selects_the_file_backend() -> Result<()> {
        let store = open_store(Some(PathBuf::from("/tmp/ncprefs-test.plist")))?;
        assert_eq!(store.location(), "/tmp/ncprefs-test.plist");
        Ok(())
    }

    #[test]
    fn default_path_points_into_library_preferences() -> Result<()> {
        if dirs::home_dir().is_none() {
            return Ok(());
        }
        let path = default_plist_path()?;
        assert!(path.ends_with("Library/Preferences/com.apple.ncprefs.plist"));
        Ok(())
    }
}
