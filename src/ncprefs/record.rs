// SPDX-License-Identifier: MIT

//! Decoding of raw `apps` array entries into [`AppRecord`]s.

use plist::Value;
use thiserror::Error;

use crate::core::types::{AppRecord, Flags};

pub(crate) const BUNDLE_ID_KEY: &str = "bundle-id";

/// Why an entry of the `apps` array could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("entry is not a dictionary")]
    NotADictionary,
    #[error("entry has no bundle-id")]
    MissingBundleId,
    #[error("{bundle_id} has no {field}")]
    MissingField {
        bundle_id: String,
        field: &'static str,
    },
    #[error("{bundle_id} has a non-integer {field}")]
    WrongType {
        bundle_id: String,
        field: &'static str,
    },
}

/// The bundle identifier of an entry, if it has a usable one.
pub(crate) fn bundle_id(entry: &Value) -> Result<&str, SkipReason> {
    entry
        .as_dictionary()
        .ok_or(SkipReason::NotADictionary)?
        .get(BUNDLE_ID_KEY)
        .and_then(Value::as_string)
        .ok_or(SkipReason::MissingBundleId)
}

fn integer_field(entry: &Value, bundle_id: &str, field: &'static str) -> Result<i64, SkipReason> {
    let value = entry
        .as_dictionary()
        .and_then(|d| d.get(field))
        .ok_or_else(|| SkipReason::MissingField {
            bundle_id: bundle_id.to_string(),
            field,
        })?;
    value
        .as_signed_integer()
        .or_else(|| value.as_unsigned_integer().map(|u| u as i64))
        .ok_or_else(|| SkipReason::WrongType {
            bundle_id: bundle_id.to_string(),
            field,
        })
}

pub fn decode_record(entry: &Value) -> Result<AppRecord, SkipReason> {
    let bundle_id = bundle_id(entry)?;
    let flags = integer_field(entry, bundle_id, "flags")?;
    let grouping = integer_field(entry, bundle_id, "grouping")?;
    let content_visibility = integer_field(entry, bundle_id, "content_visibility")?;

    Ok(AppRecord {
        bundle_id: bundle_id.to_string(),
        flags: Flags(flags as u64),
        grouping,
        content_visibility,
    })
}
