// SPDX-License-Identifier: MIT

//! Library API for ncprefs-rs: per-app Notification Center settings on macOS.
//!
//! The settings live in the `com.apple.ncprefs` preferences domain as an
//! array of app records whose `flags` integer packs most toggles. This crate
//! decodes those records, stages edits in a [`NcPrefs`] session and commits
//! them back through a [`PrefStore`](preferences::PrefStore).

pub mod core;
pub mod dispatch;
pub mod ncprefs;
pub mod preferences;
mod prettifier;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::core::error::NcError;
pub use crate::core::types::{
    AlertStyle, AppRecord, ContentVisibility, Field, Flags, Grouping, PreviewPolicy, Toggle,
};
pub use crate::ncprefs::NcPrefs;
