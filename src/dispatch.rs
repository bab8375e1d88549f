// SPDX-License-Identifier: MIT

//! Command dispatch: one [`Operation`] per command-line flag, executed in order
//! against a shared [`NcPrefs`] session.
//!
//! Get operations print to the supplied writer. Set operations only stage
//! changes; [`execute`] commits them once, after every operation succeeded.

use std::io::Write;

use anyhow::Context as _;
use tracing::debug;

use crate::{
    core::{
        error::NcError,
        flags::{
            Setting, decode_alert_style, decode_boolean_setting, decode_preview_policy,
            encode_alert_style, encode_disallow,
        },
        types::{AlertStyle, ContentVisibility, Field, Grouping, Toggle},
    },
    ncprefs::{AppNames, CommitSummary, NcPrefs, Reloader},
    prettifier::info_string,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Info(String),
    GetAlertStyle(String),
    GetSetting(Setting, String),
    GetPreview(String),
    GetContentVisibility(String),
    GetGrouping(String),
    SetAlertStyle(AlertStyle, Vec<String>),
    SetSetting(Setting, Toggle, Vec<String>),
    SetContentVisibility(ContentVisibility, Vec<String>),
    SetGrouping(Grouping, Vec<String>),
    Disallow(Vec<String>),
    GetGlobalPreviews,
    SetGlobalPreviews(ContentVisibility),
}

/// Collaborators an operation run needs besides the session.
pub struct Collaborators<'a> {
    pub names: &'a dyn AppNames,
    pub reloader: &'a dyn Reloader,
}

/// Runs `ops` in order, then commits staged changes once.
///
/// The first error aborts the run before anything is written.
pub fn execute(
    prefs: &mut NcPrefs<'_>,
    ops: &[Operation],
    ctx: &Collaborators<'_>,
    out: &mut dyn Write,
) -> Result<CommitSummary, NcError> {
    for op in ops {
        debug!(?op, "dispatch");
        run_one(prefs, op, ctx.names, out)?;
    }
    prefs.commit(ctx.reloader)
}

fn emit(out: &mut dyn Write, line: impl std::fmt::Display) -> Result<(), NcError> {
    writeln!(out, "{line}").context("Failed to write output")?;
    Ok(())
}

fn run_one(
    prefs: &mut NcPrefs<'_>,
    op: &Operation,
    names: &dyn AppNames,
    out: &mut dyn Write,
) -> Result<(), NcError> {
    match op {
        Operation::List => {
            for app in prefs.list(names) {
                emit(out, format_args!("{} ({})", app.name, app.bundle_id))?;
            }
        }
        Operation::Info(id) => {
            let found = prefs.find(id)?;
            let text = info_string(&found.record, &names.display_name(id))?;
            write!(out, "{text}").context("Failed to write output")?;
        }
        Operation::GetAlertStyle(id) => {
            emit(out, decode_alert_style(prefs.find(id)?.record.flags))?;
        }
        Operation::GetSetting(setting, id) => {
            let flags = prefs.find(id)?.record.flags;
            emit(out, decode_boolean_setting(flags, setting.check_available(id)?))?;
        }
        Operation::GetPreview(id) => {
            emit(out, decode_preview_policy(prefs.find(id)?.record.flags))?;
        }
        Operation::GetContentVisibility(id) => {
            let raw = prefs.find(id)?.record.content_visibility;
            emit(out, ContentVisibility::try_from(raw)?)?;
        }
        Operation::GetGrouping(id) => {
            emit(out, Grouping::try_from(prefs.find(id)?.record.grouping)?)?;
        }
        Operation::SetAlertStyle(style, ids) => {
            for id in ids {
                let found = prefs.find(id)?;
                let flags = encode_alert_style(*style, found.record.flags);
                prefs.apply(found.index, Field::Flags(flags))?;
            }
        }
        Operation::SetSetting(setting, toggle, ids) => {
            for id in ids {
                let found = prefs.find(id)?;
                setting.check_available(id)?;
                let flags = setting.encode(toggle.is_enable(), found.record.flags);
                prefs.apply(found.index, Field::Flags(flags))?;
            }
        }
        Operation::SetContentVisibility(value, ids) => {
            for id in ids {
                let found = prefs.find(id)?;
                prefs.apply(found.index, Field::ContentVisibility(*value))?;
            }
        }
        Operation::SetGrouping(value, ids) => {
            for id in ids {
                let found = prefs.find(id)?;
                prefs.apply(found.index, Field::Grouping(*value))?;
            }
        }
        Operation::Disallow(ids) => {
            for id in ids {
                let found = prefs.find(id)?;
                prefs.apply(found.index, Field::Flags(encode_disallow(found.record.flags)))?;
            }
        }
        Operation::GetGlobalPreviews => {
            emit(out, prefs.global_content_visibility()?)?;
        }
        Operation::SetGlobalPreviews(value) => {
            prefs.set_global_content_visibility(*value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        core::flags::{
            ALERTS, ALLOW_NOTIFICATIONS, BADGE_APP_ICON, BANNERS, PREVIEW_ALWAYS,
            SHOW_ON_LOCK_SCREEN,
        },
        ncprefs::NoReload,
        preferences::{APPS_KEY, GLOBAL_CONTENT_VISIBILITY_KEY, MemoryStore},
    };
    use plist::{Dictionary, Value};
    use pretty_assertions::assert_eq;

    struct Unresolved;

    impl AppNames for Unresolved {
        fn display_name(&self, _bundle_id: &str) -> String {
            "Example".to_string()
        }
    }

    #[derive(Default)]
    struct CountingReloader(Cell<usize>);

    impl Reloader for CountingReloader {
        fn apply(&self) -> anyhow::Result<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    fn store(flags: u64, global: i64) -> MemoryStore {
        let mut app = Dictionary::new();
        app.insert("bundle-id".into(), Value::String("com.example.App".into()));
        app.insert("flags".into(), Value::Integer(flags.into()));
        app.insert("grouping".into(), Value::Integer(0.into()));
        app.insert("content_visibility".into(), Value::Integer(1.into()));
        let mut root = Dictionary::new();
        root.insert(APPS_KEY.into(), Value::Array(vec![Value::Dictionary(app)]));
        root.insert(GLOBAL_CONTENT_VISIBILITY_KEY.into(), Value::Integer(global.into()));
        MemoryStore::new(root)
    }

    fn run(store: &mut MemoryStore, ops: &[Operation]) -> Result<String, NcError> {
        let mut prefs = NcPrefs::load(store)?;
        let ctx = Collaborators {
            names: &Unresolved,
            reloader: &NoReload,
        };
        let mut out: Vec<u8> = Vec::new();
        execute(&mut prefs, ops, &ctx, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn id() -> String {
        "com.example.App".to_string()
    }

    #[test]
    fn unapproved_app_refuses_get_badge_icon() {
        let mut s = store(BADGE_APP_ICON, 2);
        let res = run(&mut s, &[Operation::GetSetting(Setting::BadgeIcon, id())]);
        assert!(matches!(res, Err(NcError::NotApproved { .. })));
    }

    #[test]
    fn alert_style_set_then_get() -> Result<(), NcError> {
        let mut s = store(ALLOW_NOTIFICATIONS, 2);
        assert_eq!(run(&mut s, &[Operation::GetAlertStyle(id())])?, "None\n");

        run(&mut s, &[Operation::SetAlertStyle(AlertStyle::Alerts, vec![id()])])?;
        assert_eq!(run(&mut s, &[Operation::GetAlertStyle(id())])?, "Alerts\n");

        let prefs = NcPrefs::load(&mut s)?;
        let flags = prefs.find("com.example.App")?.record.flags;
        assert!(flags.contains(ALERTS));
        assert!(!flags.contains(BANNERS));
        Ok(())
    }

    #[test]
    fn disabling_lock_screen_sets_the_inverted_bit() -> Result<(), NcError> {
        let mut s = store(ALLOW_NOTIFICATIONS, 2);
        run(
            &mut s,
            &[Operation::SetSetting(Setting::LockScreen, Toggle::Disable, vec![id()])],
        )?;
        let out = run(&mut s, &[Operation::GetSetting(Setting::LockScreen, id())])?;
        assert_eq!(out, "false\n");

        let prefs = NcPrefs::load(&mut s)?;
        assert!(prefs.find("com.example.App")?.record.flags.contains(SHOW_ON_LOCK_SCREEN));
        Ok(())
    }

    #[test]
    fn global_previews_decode_or_fail() -> Result<(), NcError> {
        let mut s = store(ALLOW_NOTIFICATIONS, 2);
        assert_eq!(run(&mut s, &[Operation::GetGlobalPreviews])?, "WhenUnlocked\n");

        let mut s = store(ALLOW_NOTIFICATIONS, 4);
        assert!(matches!(
            run(&mut s, &[Operation::GetGlobalPreviews]),
            Err(NcError::CorruptState { value: 4, .. })
        ));
        Ok(())
    }

    #[test]
    fn several_mutations_commit_once() -> Result<(), NcError> {
        let mut s = store(ALLOW_NOTIFICATIONS, 2);
        let reloader = CountingReloader::default();
        {
            let mut prefs = NcPrefs::load(&mut s)?;
            let ctx = Collaborators {
                names: &Unresolved,
                reloader: &reloader,
            };
            let ops = [
                Operation::SetSetting(Setting::PlaySound, Toggle::Enable, vec![id()]),
                Operation::SetSetting(Setting::BadgeIcon, Toggle::Enable, vec![id()]),
                Operation::SetGlobalPreviews(ContentVisibility::Never),
            ];
            execute(&mut prefs, &ops, &ctx, &mut std::io::sink())?;
        }
        assert_eq!(reloader.0.get(), 1);
        assert_eq!(s.writes(), 2);
        assert_eq!(
            run(
                &mut s,
                &[
                    Operation::GetSetting(Setting::PlaySound, id()),
                    Operation::GetSetting(Setting::BadgeIcon, id()),
                    Operation::GetGlobalPreviews,
                ]
            )?,
            "true\ntrue\nNever\n"
        );
        Ok(())
    }

    #[test]
    fn a_failing_operation_writes_nothing() {
        let mut s = store(ALLOW_NOTIFICATIONS, 2);
        let res = run(
            &mut s,
            &[
                Operation::SetGrouping(Grouping::Off, vec![id()]),
                Operation::GetAlertStyle("com.example.Missing".into()),
            ],
        );
        assert!(matches!(res, Err(NcError::NotFound { .. })));
        assert_eq!(s.writes(), 0);
    }

    #[test]
    fn restricted_settings_are_refused_for_other_apps() {
        let mut s = store(ALLOW_NOTIFICATIONS, 2);
        let res = run(
            &mut s,
            &[Operation::SetSetting(Setting::CriticalAlerts, Toggle::Enable, vec![id()])],
        );
        assert!(matches!(res, Err(NcError::NotSupported { .. })));
    }

    #[test]
    fn disallow_revokes_approval() -> Result<(), NcError> {
        let mut s = store(ALLOW_NOTIFICATIONS | BADGE_APP_ICON, 2);
        run(&mut s, &[Operation::Disallow(vec![id()])])?;
        assert!(matches!(
            run(&mut s, &[Operation::GetAlertStyle(id())]),
            Err(NcError::NotApproved { .. })
        ));
        Ok(())
    }

    #[test]
    fn list_prints_name_and_bundle_id() -> Result<(), NcError> {
        let mut s = store(0, 2);
        assert_eq!(run(&mut s, &[Operation::List])?, "Example (com.example.App)\n");
        Ok(())
    }

    #[test]
    fn disabled_previews_stay_hidden_when_bit_13_was_set() -> Result<(), NcError> {
        let mut s = store(ALLOW_NOTIFICATIONS | PREVIEW_ALWAYS, 2);
        run(
            &mut s,
            &[Operation::SetSetting(Setting::ShowPreview, Toggle::Disable, vec![id()])],
        )?;
        assert_eq!(run(&mut s, &[Operation::GetPreview(id())])?, "Suppressed\n");

        run(
            &mut s,
            &[Operation::SetSetting(Setting::ShowPreview, Toggle::Enable, vec![id()])],
        )?;
        assert_eq!(run(&mut s, &[Operation::GetPreview(id())])?, "Always\n");
        Ok(())
    }

    #[test]
    fn lookup_errors_come_before_restricted_setting_errors() {
        let mut s = store(ALLOW_NOTIFICATIONS, 2);
        let res = run(
            &mut s,
            &[Operation::GetSetting(Setting::CriticalAlerts, "com.example.Missing".into())],
        );
        assert!(matches!(res, Err(NcError::NotFound { .. })));

        let mut s = store(BANNERS, 2);
        let res = run(
            &mut s,
            &[Operation::SetSetting(Setting::CriticalAlerts, Toggle::Enable, vec![id()])],
        );
        assert!(matches!(res, Err(NcError::NotApproved { .. })));
    }
}
