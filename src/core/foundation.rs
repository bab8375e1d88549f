// SPDX-License-Identifier: MIT

//! CoreFoundation-based preferences access.
//!
//! Provides minimal CFPreferences integration for a single application domain:
//! - Single key read
//! - Single key write followed by a synchronize

use anyhow::{Result, bail};

use core_foundation::{
    base::{CFRelease, TCFType},
    string::CFString,
};

use core_foundation_sys::preferences::{
    CFPreferencesAppSynchronize, CFPreferencesCopyAppValue, CFPreferencesSetAppValue,
};

use crate::core::convert::{cf_to_value, value_to_cf};

/// Read a single key, `None` when the domain does not define it.
pub(crate) fn read_pref(domain: &str, key: &str) -> Result<Option<plist::Value>> {
    unsafe {
        let domain_cf = CFString::new(domain);
        let key_cf = CFString::new(key);
        let raw = CFPreferencesCopyAppValue(
            key_cf.as_concrete_TypeRef(),
            domain_cf.as_concrete_TypeRef(),
        );
        if raw.is_null() {
            return Ok(None);
        }
        let value = cf_to_value(raw);
        CFRelease(raw);
        match value {
            Some(v) => Ok(Some(v)),
            None => bail!("Unsupported CoreFoundation type for {domain}: {key}"),
        }
    }
}

/// Write (set) a single key in a domain and flush it to disk.
pub(crate) fn write_pref(domain: &str, key: &str, value: &plist::Value) -> Result<()> {
    unsafe {
        let domain_cf = CFString::new(domain);
        let key_cf = CFString::new(key);
        let value_ref = value_to_cf(value);
        CFPreferencesSetAppValue(
            key_cf.as_concrete_TypeRef(),
            value_ref,
            domain_cf.as_concrete_TypeRef(),
        );
        CFRelease(value_ref);
        if CFPreferencesAppSynchronize(domain_cf.as_concrete_TypeRef()) != 0 {
            Ok(())
        } else {
            bail!("Failed to write key: {}", key)
        }
    }
}
