// SPDX-License-Identifier: MIT

//! Building blocks shared by the session and the CLI: errors, decoded types,
//! the flag codec and, on macOS, the CoreFoundation bridge.

pub mod error;
pub mod flags;
pub mod types;

#[cfg(target_os = "macos")]
pub(crate) mod convert;
#[cfg(target_os = "macos")]
pub(crate) mod foundation;
