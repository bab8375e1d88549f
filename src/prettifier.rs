// SPDX-License-Identifier: MIT

use crate::core::{
    error::NcError,
    flags::{Setting, decode_alert_style, decode_boolean_setting, decode_preview_policy},
    types::{AppRecord, ContentVisibility, Grouping},
};

const LABEL_WIDTH: usize = 36;

/// Render every decoded setting of a record as an aligned `label: value` block (for `--get-info`).
///
/// Restricted settings are only listed for the apps macOS offers them to.
pub(crate) fn info_string(record: &AppRecord, app_name: &str) -> Result<String, NcError> {
    let flags = record.flags;
    let mut rows: Vec<(&str, String)> = vec![
        ("Application", format!("{app_name} ({})", record.bundle_id)),
        ("Alert style", decode_alert_style(flags).to_string()),
    ];

    for setting in [
        Setting::LockScreen,
        Setting::NotificationCenter,
        Setting::BadgeIcon,
        Setting::PlaySound,
        Setting::CriticalAlerts,
        Setting::TimeSensitiveAlerts,
    ] {
        let bit = setting.bit();
        if bit.available_for(&record.bundle_id) {
            rows.push((bit.label, decode_boolean_setting(flags, bit).to_string()));
        }
    }

    rows.push(("Preview on lock screen", decode_preview_policy(flags).to_string()));
    rows.push((
        "Show previews",
        ContentVisibility::try_from(record.content_visibility)?.to_string(),
    ));
    rows.push((
        "Notification grouping",
        Grouping::try_from(record.grouping)?.to_string(),
    ));

    let mut out = String::new();
    for (label, value) in rows {
        out.push_str(&format!("{:<width$}{value}\n", format!("{label}:"), width = LABEL_WIDTH));
    }
    Ok(out)
}
