// SPDX-License-Identifier: MIT

//! CLI definition and argument helpers for ncprefs-rs.
//
// This module is responsible for:
// - Defining the command-line interface (CLI) structure using clap.
// - Turning parsed flags into an ordered list of dispatch operations.
// - The interactive fuzzy picker behind `--pick`.
//
// No preference access happens here.
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::{
    core::{error::NcError, flags::Setting},
    dispatch::Operation,
    ncprefs::AppListing,
};

/// A boolean setting exposed as a `--get-*` / `--set-*` pair.
struct Toggleable {
    get: &'static str,
    set: &'static str,
    short: char,
    setting: Setting,
    get_help: &'static str,
    set_help: &'static str,
}

const TOGGLEABLE: [Toggleable; 6] = [
    Toggleable {
        get: "get-lock-screen",
        set: "set-lock-screen",
        short: 'o',
        setting: Setting::LockScreen,
        get_help: "Get 'Show notifications on lock screen'",
        set_help: "Set 'Show notifications on lock screen'",
    },
    Toggleable {
        get: "get-notification-center",
        set: "set-notification-center",
        short: 'n',
        setting: Setting::NotificationCenter,
        get_help: "Get 'Show in Notification Center'",
        set_help: "Set 'Show in Notification Center'",
    },
    Toggleable {
        get: "get-badge-icon",
        set: "set-badge-icon",
        short: 'b',
        setting: Setting::BadgeIcon,
        get_help: "Get 'Badge app icon'",
        set_help: "Set 'Badge app icon'",
    },
    Toggleable {
        get: "get-play-sound",
        set: "set-play-sound",
        short: 'p',
        setting: Setting::PlaySound,
        get_help: "Get 'Play sound for notifications'",
        set_help: "Set 'Play sound for notifications'",
    },
    Toggleable {
        get: "get-critical-alerts",
        set: "set-critical-alerts",
        short: 'c',
        setting: Setting::CriticalAlerts,
        get_help: "Get 'Allow critical alerts' (Home only)",
        set_help: "Set 'Allow critical alerts' (Home only)",
    },
    Toggleable {
        get: "get-time-sensitive-alerts",
        set: "set-time-sensitive-alerts",
        short: 't',
        setting: Setting::TimeSensitiveAlerts,
        get_help: "Get 'Allow time-sensitive alerts'",
        set_help: "Set 'Allow time-sensitive alerts'",
    },
];

fn get_arg(id: &'static str, short: Option<char>, help: &'static str) -> Arg {
    let mut a = Arg::new(id)
        .long(id)
        .value_name("BUNDLE_ID")
        .num_args(1)
        .help(help);
    if let Some(c) = short {
        a = a.short(c)
    }
    a
}

fn set_arg(id: &'static str, choices: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .num_args(2..)
        .value_names([choices, "BUNDLE_ID"])
        .help(help)
}

fn flag(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help).action(ArgAction::SetTrue)
}

pub fn build_cli() -> Command {
    let mut cmd = Command::new("ncprefs")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .arg(flag("list", "List apps in Notification Center with their bundle ids").short('l'))
        .arg(flag("pick", "Fuzzy-pick an app and print its bundle id"))
        .arg(get_arg(
            "get-info",
            Some('i'),
            "Print every notification setting of an app",
        ))
        .arg(get_arg("get-alert-style", Some('a'), "Get 'Alert style'"))
        .arg(get_arg(
            "get-show-preview",
            Some('r'),
            "Get the preview policy derived from the lock screen and preview bits",
        ))
        .arg(get_arg(
            "get-content-visibility",
            None,
            "Get the per-app 'Show previews' setting",
        ))
        .arg(get_arg(
            "get-grouping",
            Some('g'),
            "Get 'Notification grouping'",
        ));

    for t in &TOGGLEABLE {
        cmd = cmd.arg(get_arg(t.get, Some(t.short), t.get_help));
    }

    cmd = cmd
        .arg(set_arg(
            "set-alert-style",
            "alerts|banners|none",
            "Set 'Alert style'",
        ))
        .arg(set_arg(
            "set-show-preview",
            "enable|disable",
            "Allow or suppress previews on the lock screen",
        ))
        .arg(set_arg(
            "set-content-visibility",
            "always|unlocked|never",
            "Set the per-app 'Show previews' setting",
        ))
        .arg(set_arg(
            "set-grouping",
            "automatic|byapp|off",
            "Set 'Notification grouping'",
        ));

    for t in &TOGGLEABLE {
        cmd = cmd.arg(set_arg(t.set, "enable|disable", t.set_help));
    }

    cmd.arg(
        Arg::new("disallow-notifications")
            .long("disallow-notifications")
            .num_args(1..)
            .value_name("BUNDLE_ID")
            .help("Turn off 'Allow notifications'; the app re-prompts on next launch"),
    )
    .arg(flag(
        "get-global-show-previews",
        "Get the global 'Show previews' setting",
    ))
    .arg(
        Arg::new("set-global-show-previews")
            .long("set-global-show-previews")
            .num_args(1)
            .value_name("always|unlocked|never")
            .help("Set the global 'Show previews' setting"),
    )
    .arg(flag("verbose", "Print diagnostic trace to stdout").short('v'))
    .arg(flag("no-reload", "Do not restart cfprefsd and usernoted after a change"))
    .arg(
        Arg::new("plist")
            .long("plist")
            .value_name("PATH")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Operate on a plist file instead of the user's preferences"),
    )
}

fn values<'a>(m: &'a ArgMatches, id: &str) -> Vec<&'a str> {
    m.get_many::<String>(id)
        .map(|vals| vals.map(String::as_str).collect())
        .unwrap_or_default()
}

/// Value token and bundle ids of a `--set-*` occurrence.
fn split_set(vals: &[&str]) -> (String, Vec<String>) {
    let token = vals.first().copied().unwrap_or_default().to_string();
    let ids = vals.iter().skip(1).map(|s| s.to_string()).collect();
    (token, ids)
}

/// Operations in command-line order.
///
/// Every value token is parsed here, so a bad argument is reported before
/// any operation runs.
pub fn operations(m: &ArgMatches) -> Result<Vec<Operation>, NcError> {
    let mut ops: Vec<(usize, Operation)> = Vec::new();
    let position = |id: &str| m.index_of(id).unwrap_or(0);

    let single = |id: &str| m.get_one::<String>(id).cloned();

    if m.get_flag("list") {
        ops.push((position("list"), Operation::List));
    }
    if let Some(id) = single("get-info") {
        ops.push((position("get-info"), Operation::Info(id)));
    }
    if let Some(id) = single("get-alert-style") {
        ops.push((position("get-alert-style"), Operation::GetAlertStyle(id)));
    }
    if let Some(id) = single("get-show-preview") {
        ops.push((position("get-show-preview"), Operation::GetPreview(id)));
    }
    if let Some(id) = single("get-content-visibility") {
        ops.push((
            position("get-content-visibility"),
            Operation::GetContentVisibility(id),
        ));
    }
    if let Some(id) = single("get-grouping") {
        ops.push((position("get-grouping"), Operation::GetGrouping(id)));
    }
    for t in &TOGGLEABLE {
        if let Some(id) = single(t.get) {
            ops.push((position(t.get), Operation::GetSetting(t.setting, id)));
        }
    }

    let vals = values(m, "set-alert-style");
    if !vals.is_empty() {
        let (token, ids) = split_set(&vals);
        ops.push((
            position("set-alert-style"),
            Operation::SetAlertStyle(token.parse()?, ids),
        ));
    }
    let vals = values(m, "set-show-preview");
    if !vals.is_empty() {
        let (token, ids) = split_set(&vals);
        ops.push((
            position("set-show-preview"),
            Operation::SetSetting(Setting::ShowPreview, token.parse()?, ids),
        ));
    }
    let vals = values(m, "set-content-visibility");
    if !vals.is_empty() {
        let (token, ids) = split_set(&vals);
        ops.push((
            position("set-content-visibility"),
            Operation::SetContentVisibility(token.parse()?, ids),
        ));
    }
    let vals = values(m, "set-grouping");
    if !vals.is_empty() {
        let (token, ids) = split_set(&vals);
        ops.push((
            position("set-grouping"),
            Operation::SetGrouping(token.parse()?, ids),
        ));
    }
    for t in &TOGGLEABLE {
        let vals = values(m, t.set);
        if !vals.is_empty() {
            let (token, ids) = split_set(&vals);
            ops.push((
                position(t.set),
                Operation::SetSetting(t.setting, token.parse()?, ids),
            ));
        }
    }

    let ids = values(m, "disallow-notifications");
    if !ids.is_empty() {
        ops.push((
            position("disallow-notifications"),
            Operation::Disallow(ids.into_iter().map(str::to_string).collect()),
        ));
    }
    if m.get_flag("get-global-show-previews") {
        ops.push((
            position("get-global-show-previews"),
            Operation::GetGlobalPreviews,
        ));
    }
    if let Some(token) = single("set-global-show-previews") {
        ops.push((
            position("set-global-show-previews"),
            Operation::SetGlobalPreviews(token.parse()?),
        ));
    }

    ops.sort_by_key(|(pos, _)| *pos);
    Ok(ops.into_iter().map(|(_, op)| op).collect())
}

/// Fuzzy-pick one app; `None` when the picker is aborted.
pub fn pick_bundle_id(apps: &[AppListing]) -> anyhow::Result<Option<String>> {
    use skim::prelude::*;
    use std::io::Cursor;

    let input = apps
        .iter()
        .map(|a| format!("{}\t{}", a.bundle_id, a.name))
        .collect::<Vec<_>>()
        .join("\n");

    let options = SkimOptionsBuilder::default()
        .height("40%".to_string())
        .multi(false)
        .prompt("app> ".to_string())
        .build()
        .map_err(|e| anyhow!("Failed to configure picker: {e}"))?;

    let items = SkimItemReader::default().of_bufread(Cursor::new(input));
    let picked = Skim::run_with(&options, Some(items))
        .filter(|out| !out.is_abort)
        .and_then(|out| out.selected_items.into_iter().next())
        .and_then(|item| {
            item.output()
                .split('\t')
                .next()
                .map(|id| id.to_string())
        });
    Ok(picked)
}
