// SPDX-License-Identifier: MIT

//! Error taxonomy for Notification Center preference operations.

use thiserror::Error;

/// Errors surfaced by lookups, codec parsing and store access.
///
/// Every variant is terminal for the current invocation: the CLI prints it
/// and exits with status 1, and no pending mutation is written.
#[derive(Debug, Error)]
pub enum NcError {
    /// No record in the `apps` array carries this bundle identifier.
    #[error("unable to find {bundle_id} in {store}")]
    NotFound { bundle_id: String, store: String },

    /// A record exists but the user never approved notifications for it.
    #[error("notifications were not user approved for {bundle_id}, nothing to do")]
    NotApproved { bundle_id: String },

    /// An enumerated token on a set operation was not recognized.
    #[error("{token:?} is not valid here, expected one of: {expected}")]
    BadArgument {
        token: String,
        expected: &'static str,
    },

    /// A stored integer lies outside the range the OS is known to write.
    #[error("stored {field} value {value} is not recognized")]
    CorruptState { field: &'static str, value: i64 },

    /// The setting is only offered by macOS for a fixed set of apps.
    #[error("'{setting}' is not available for {bundle_id}")]
    NotSupported {
        setting: &'static str,
        bundle_id: String,
    },

    /// The preference backend failed to read or write.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl NcError {
    pub(crate) fn bad_argument(token: &str, expected: &'static str) -> Self {
        NcError::BadArgument {
            token: token.to_string(),
            expected,
        }
    }
}
