// SPDX-License-Identifier: MIT

//! Operating-system collaborators: reloading the notification daemons and
//! resolving an app's display name.

use std::{path::Path, process::Command};

use anyhow::{Result, bail};
use tracing::debug;

/// Daemons that cache `com.apple.ncprefs` and must be restarted to pick up a write.
pub const RELOADED_PROCESSES: [&str; 2] = ["cfprefsd", "usernoted"];

/// Makes written settings take effect.
pub trait Reloader {
    fn apply(&self) -> Result<()>;
}

/// Terminates [`RELOADED_PROCESSES`]; launchd restarts them on demand.
pub struct KillDaemons;

impl Reloader for KillDaemons {
    fn apply(&self) -> Result<()> {
        debug!(processes = ?RELOADED_PROCESSES, "killall");
        let status = Command::new("killall").args(RELOADED_PROCESSES).status()?;
        if !status.success() {
            bail!("killall exited with {status}");
        }
        Ok(())
    }
}

/// Leaves the daemons running (`--no-reload`).
pub struct NoReload;

impl Reloader for NoReload {
    fn apply(&self) -> Result<()> {
        debug!("reload skipped");
        Ok(())
    }
}

/// Name shown for bundle ids that do not resolve to an installed app.
pub const UNRESOLVED_APP_NAME: &str = "SYSTEM";

/// Maps a bundle identifier to a human-readable app name.
pub trait AppNames {
    fn display_name(&self, bundle_id: &str) -> String;
}

/// Resolves bundle ids through the Spotlight index (`mdfind`).
pub struct Spotlight;

impl Spotlight {
    fn app_path(bundle_id: &str) -> Option<String> {
        let query = format!("kMDItemCFBundleIdentifier == '{}'", bundle_id.replace('\'', ""));
        let output = Command::new("mdfind").arg(query).output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .find(|l| l.ends_with(".app"))
            .map(str::to_string)
    }
}

impl AppNames for Spotlight {
    fn display_name(&self, bundle_id: &str) -> String {
        Self::app_path(bundle_id)
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNRESOLVED_APP_NAME.to_string())
    }
}
