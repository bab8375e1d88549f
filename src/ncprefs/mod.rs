// SPDX-License-Identifier: MIT

//! Notification Center session: locating, mutating and committing app records.
//!
//! A [`NcPrefs`] is loaded once per invocation and passed to every operation.
//! Mutations only touch the in-memory copy; [`NcPrefs::commit`] writes the
//! whole `apps` array (and the global preview setting, when changed) back in
//! a single pass and then reloads the daemons once.

mod record;
mod system;

use plist::Value;
use tracing::{debug, warn};

use crate::{
    core::{
        error::NcError,
        flags::is_approved,
        types::{AppRecord, ContentVisibility, Field},
    },
    preferences::{APPS_KEY, GLOBAL_CONTENT_VISIBILITY_KEY, PrefStore},
};

pub use record::{SkipReason, decode_record};
pub use system::{
    AppNames, KillDaemons, NoReload, RELOADED_PROCESSES, Reloader, Spotlight,
    UNRESOLVED_APP_NAME,
};

/// A record found by [`NcPrefs::find`], with its position in the `apps` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub index: usize,
    pub record: AppRecord,
}

/// One line of `--list` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppListing {
    pub name: String,
    pub bundle_id: String,
}

/// What [`NcPrefs::commit`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub apps_written: bool,
    pub global_written: bool,
}

impl CommitSummary {
    pub fn wrote_anything(&self) -> bool {
        self.apps_written || self.global_written
    }
}

pub struct NcPrefs<'a> {
    store: &'a mut dyn PrefStore,
    apps: Vec<Value>,
    apps_dirty: bool,
    pending_global: Option<ContentVisibility>,
}

impl<'a> NcPrefs<'a> {
    /// Reads the `apps` array; a domain without one is treated as empty.
    pub fn load(store: &'a mut dyn PrefStore) -> Result<Self, NcError> {
        let apps = match store.get(APPS_KEY)? {
            Some(Value::Array(apps)) => apps,
            Some(_) => {
                return Err(anyhow::anyhow!(
                    "'{APPS_KEY}' in {} is not an array",
                    store.location()
                )
                .into());
            }
            None => Vec::new(),
        };
        debug!(records = apps.len(), store = %store.location(), "loaded apps");

        Ok(NcPrefs {
            store,
            apps,
            apps_dirty: false,
            pending_global: None,
        })
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Every entry in store order, decoded or with the reason it was skipped.
    pub fn entries(&self) -> impl Iterator<Item = (usize, Result<AppRecord, SkipReason>)> + '_ {
        self.apps
            .iter()
            .enumerate()
            .map(|(i, v)| (i, decode_record(v)))
    }

    /// First record matching `bundle_id`, provided notifications are approved for it.
    ///
    /// Malformed entries are skipped and traced; later duplicates are never seen.
    pub fn find(&self, bundle_id: &str) -> Result<Located, NcError> {
        for (index, entry) in self.entries() {
            match entry {
                Ok(record) if record.bundle_id == bundle_id => {
                    debug!(
                        bundle_id,
                        index,
                        flags = %record.flags,
                        grouping = record.grouping,
                        content_visibility = record.content_visibility,
                        "found record"
                    );
                    if !is_approved(record.flags) {
                        return Err(NcError::NotApproved {
                            bundle_id: bundle_id.to_string(),
                        });
                    }
                    return Ok(Located { index, record });
                }
                Ok(_) => {}
                Err(reason) => debug!(index, %reason, "skipped record"),
            }
        }
        Err(NcError::NotFound {
            bundle_id: bundle_id.to_string(),
            store: self.location(),
        })
    }

    /// Replaces one field of the record at `index`, leaving other keys intact.
    pub fn apply(&mut self, index: usize, field: Field) -> Result<(), NcError> {
        let dict = self
            .apps
            .get_mut(index)
            .and_then(Value::as_dictionary_mut)
            .ok_or_else(|| anyhow::anyhow!("no app record at index {index}"))?;
        debug!(index, key = field.key(), value = ?field, "apply");
        dict.insert(field.key().to_string(), field.plist_value());
        self.apps_dirty = true;
        Ok(())
    }

    /// Global "Show previews"; a pending, uncommitted change is returned as is.
    pub fn global_content_visibility(&self) -> Result<ContentVisibility, NcError> {
        if let Some(pending) = self.pending_global {
            return Ok(pending);
        }
        let raw = self
            .store
            .get(GLOBAL_CONTENT_VISIBILITY_KEY)?
            .and_then(|v| v.as_signed_integer())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "'{GLOBAL_CONTENT_VISIBILITY_KEY}' is not set in {}",
                    self.location()
                )
            })?;
        ContentVisibility::try_from(raw)
    }

    pub fn set_global_content_visibility(&mut self, value: ContentVisibility) {
        debug!(value = %value, "pending global content_visibility");
        self.pending_global = Some(value);
    }

    /// Listing sorted case-insensitively by display name (stable on ties).
    pub fn list(&self, names: &dyn AppNames) -> Vec<AppListing> {
        let mut out: Vec<AppListing> = self
            .apps
            .iter()
            .enumerate()
            .filter_map(|(index, v)| match record::bundle_id(v) {
                Ok(id) => Some(AppListing {
                    name: names.display_name(id),
                    bundle_id: id.to_string(),
                }),
                Err(reason) => {
                    debug!(index, %reason, "skipped record");
                    None
                }
            })
            .collect();
        out.sort_by_key(|a| a.name.to_lowercase());
        out
    }

    /// Writes pending changes once and reloads the daemons once.
    ///
    /// A reload failure is logged and otherwise ignored: the settings are
    /// already persisted and will apply on next login at the latest.
    pub fn commit(&mut self, reloader: &dyn Reloader) -> Result<CommitSummary, NcError> {
        let mut summary = CommitSummary::default();

        if self.apps_dirty {
            self.store.set(APPS_KEY, Value::Array(self.apps.clone()))?;
            self.apps_dirty = false;
            summary.apps_written = true;
        }
        if let Some(global) = self.pending_global.take() {
            self.store.set(
                GLOBAL_CONTENT_VISIBILITY_KEY,
                Value::Integer(global.raw().into()),
            )?;
            summary.global_written = true;
        }

        if summary.wrote_anything() {
            debug!(?summary, store = %self.location(), "committed");
            if let Err(e) = reloader.apply() {
                warn!("settings written but the notification daemons were not reloaded: {e:#}");
            }
        }
        Ok(summary)
    }
}
