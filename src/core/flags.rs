// SPDX-License-Identifier: MIT

//! Bit layout of the `flags` integer and the pure codec built on it.
//!
//! Boolean settings are described by [`FlagBit`] entries in [`SETTING_BITS`];
//! the codec never hard-codes a polarity, so correcting a bit for a new macOS
//! release means editing one table row.

use crate::core::{
    error::NcError,
    types::{AlertStyle, Flags, PreviewPolicy},
};

pub const SHOW_IN_NOTIFICATION_CENTER: u64 = 1 << 0;
pub const BADGE_APP_ICON: u64 = 1 << 1;
pub const PLAY_SOUND: u64 = 1 << 2;
pub const BANNERS: u64 = 1 << 3;
pub const ALERTS: u64 = 1 << 4;
pub const SHOW_ON_LOCK_SCREEN: u64 = 1 << 12;
pub const PREVIEW_ALWAYS: u64 = 1 << 13;
pub const PREVIEW_SUPPRESSED: u64 = 1 << 14;
pub const ALLOW_NOTIFICATIONS: u64 = 1 << 25;
pub const CRITICAL_ALERTS: u64 = 1 << 26;
pub const TIME_SENSITIVE_ALERTS: u64 = 1 << 29;

const ALERT_STYLE_MASK: u64 = BANNERS | ALERTS;

const CRITICAL_ALERT_APPS: &[&str] = &["com.apple.Home"];

const TIME_SENSITIVE_APPS: &[&str] = &[
    "com.apple.iBooksX",
    "com.apple.iCal",
    "com.apple.gamecenter",
    "com.apple.Home",
    "com.apple.MobileSMS",
    "com.apple.reminders",
    "com.apple.ScreenTimeNotifications",
    "com.apple.Passbook",
];

/// One boolean setting packed into `flags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagBit {
    /// Label used in messages and `--get-info` output.
    pub label: &'static str,
    pub mask: u64,
    /// When set, the setting is enabled while the bit is clear.
    pub inverted: bool,
    /// Apps for which macOS offers the setting at all; `None` means every app.
    pub restricted_to: Option<&'static [&'static str]>,
}

impl FlagBit {
    pub fn available_for(&self, bundle_id: &str) -> bool {
        self.restricted_to
            .is_none_or(|apps| apps.contains(&bundle_id))
    }
}

/// Boolean settings addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    NotificationCenter,
    BadgeIcon,
    PlaySound,
    LockScreen,
    ShowPreview,
    CriticalAlerts,
    TimeSensitiveAlerts,
}

/// Indexed by `Setting as usize`.
pub static SETTING_BITS: [FlagBit; 7] = [
    // Revisions of the OS disagree on this bit; flip `inverted` if the
    // notification center toggle reads backwards.
    FlagBit {
        label: "Show in Notification Center",
        mask: SHOW_IN_NOTIFICATION_CENTER,
        inverted: false,
        restricted_to: None,
    },
    FlagBit {
        label: "Badge app icon",
        mask: BADGE_APP_ICON,
        inverted: false,
        restricted_to: None,
    },
    FlagBit {
        label: "Play sound for notifications",
        mask: PLAY_SOUND,
        inverted: false,
        restricted_to: None,
    },
    FlagBit {
        label: "Show notifications on lock screen",
        mask: SHOW_ON_LOCK_SCREEN,
        inverted: true,
        restricted_to: None,
    },
    FlagBit {
        label: "Show previews",
        mask: PREVIEW_SUPPRESSED,
        inverted: true,
        restricted_to: None,
    },
    FlagBit {
        label: "Allow critical alerts",
        mask: CRITICAL_ALERTS,
        inverted: false,
        restricted_to: Some(CRITICAL_ALERT_APPS),
    },
    FlagBit {
        label: "Allow time-sensitive alerts",
        mask: TIME_SENSITIVE_ALERTS,
        inverted: false,
        restricted_to: Some(TIME_SENSITIVE_APPS),
    },
];

impl Setting {
    pub fn bit(self) -> &'static FlagBit {
        &SETTING_BITS[self as usize]
    }

    pub fn encode(self, enable: bool, flags: Flags) -> Flags {
        match self {
            Setting::ShowPreview => encode_show_preview(enable, flags),
            _ => encode_boolean_setting(enable, flags, self.bit()),
        }
    }

    /// Fails with `NotSupported` when macOS does not offer the setting for the app.
    pub fn check_available(self, bundle_id: &str) -> Result<&'static FlagBit, NcError> {
        let bit = self.bit();
        if bit.available_for(bundle_id) {
            Ok(bit)
        } else {
            Err(NcError::NotSupported {
                setting: bit.label,
                bundle_id: bundle_id.to_string(),
            })
        }
    }
}

pub fn is_approved(flags: Flags) -> bool {
    flags.contains(ALLOW_NOTIFICATIONS)
}

/// Alerts wins over Banners when both bits are present.
pub fn decode_alert_style(flags: Flags) -> AlertStyle {
    if flags.contains(ALERTS) {
        AlertStyle::Alerts
    } else if flags.contains(BANNERS) {
        AlertStyle::Banners
    } else {
        AlertStyle::None
    }
}

pub fn encode_alert_style(style: AlertStyle, flags: Flags) -> Flags {
    let cleared = flags.without(ALERT_STYLE_MASK);
    match style {
        AlertStyle::None => cleared,
        AlertStyle::Banners => cleared.with(BANNERS),
        AlertStyle::Alerts => cleared.with(ALERTS),
    }
}

pub fn decode_boolean_setting(flags: Flags, bit: &FlagBit) -> bool {
    flags.contains(bit.mask) != bit.inverted
}

pub fn encode_boolean_setting(enable: bool, flags: Flags, bit: &FlagBit) -> Flags {
    if enable != bit.inverted {
        flags.with(bit.mask)
    } else {
        flags.without(bit.mask)
    }
}

/// Writes the whole 13/14 pair: bit 14 only hides previews while bit 13 is clear.
pub fn encode_show_preview(enable: bool, flags: Flags) -> Flags {
    if enable {
        flags.without(PREVIEW_SUPPRESSED)
    } else {
        flags.with(PREVIEW_SUPPRESSED).without(PREVIEW_ALWAYS)
    }
}

/// Previews only exist where notifications reach the lock screen; an app
/// hidden from it is always `Suppressed` whatever the preview bits say.
pub fn decode_preview_policy(flags: Flags) -> PreviewPolicy {
    if !decode_boolean_setting(flags, Setting::LockScreen.bit()) {
        return PreviewPolicy::Suppressed;
    }
    match (flags.contains(PREVIEW_SUPPRESSED), flags.contains(PREVIEW_ALWAYS)) {
        (false, _) => PreviewPolicy::Always,
        (true, true) => PreviewPolicy::WhenUnlocked,
        (true, false) => PreviewPolicy::Suppressed,
    }
}

/// Revokes the user's approval; macOS re-prompts on the app's next launch.
pub fn encode_disallow(flags: Flags) -> Flags {
    flags.without(ALLOW_NOTIFICATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLES: [u64; 6] = [
        0,
        ALLOW_NOTIFICATIONS,
        BANNERS | ALERTS,
        u64::MAX,
        0b1010_1010_1010_1010,
        ALLOW_NOTIFICATIONS | SHOW_ON_LOCK_SCREEN | BADGE_APP_ICON | ALERTS,
    ];

    const ALL_SETTINGS: [Setting; 7] = [
        Setting::NotificationCenter,
        Setting::BadgeIcon,
        Setting::PlaySound,
        Setting::LockScreen,
        Setting::ShowPreview,
        Setting::CriticalAlerts,
        Setting::TimeSensitiveAlerts,
    ];

    #[test]
    fn alert_style_survives_encode_then_decode() {
        for raw in SAMPLES {
            for style in [AlertStyle::None, AlertStyle::Banners, AlertStyle::Alerts] {
                assert_eq!(decode_alert_style(encode_alert_style(style, Flags(raw))), style);
            }
        }
    }

    #[test]
    fn alert_style_encoding_leaves_at_most_one_bit() {
        for raw in SAMPLES {
            for style in [AlertStyle::None, AlertStyle::Banners, AlertStyle::Alerts] {
                let out = encode_alert_style(style, Flags(raw));
                assert!((out.0 & ALERT_STYLE_MASK).count_ones() <= 1);
                // bits outside the selector are untouched
                assert_eq!(out.0 & !ALERT_STYLE_MASK, raw & !ALERT_STYLE_MASK);
            }
        }
    }

    #[test]
    fn alerts_bit_wins_when_both_are_set() {
        assert_eq!(decode_alert_style(Flags(BANNERS | ALERTS)), AlertStyle::Alerts);
        assert_eq!(decode_alert_style(Flags(BANNERS)), AlertStyle::Banners);
        assert_eq!(decode_alert_style(Flags(ALLOW_NOTIFICATIONS)), AlertStyle::None);
    }

    #[test]
    fn boolean_settings_round_trip_for_both_polarities() {
        for setting in ALL_SETTINGS {
            let bit = setting.bit();
            for raw in SAMPLES {
                assert!(decode_boolean_setting(
                    encode_boolean_setting(true, Flags(raw), bit),
                    bit
                ));
                assert!(!decode_boolean_setting(
                    encode_boolean_setting(false, Flags(raw), bit),
                    bit
                ));
            }
        }
    }

    #[test]
    fn lock_screen_bit_is_inverted() {
        let bit = Setting::LockScreen.bit();
        assert!(decode_boolean_setting(Flags(0), bit));
        assert!(!decode_boolean_setting(Flags(SHOW_ON_LOCK_SCREEN), bit));
        assert_eq!(
            encode_boolean_setting(false, Flags(ALLOW_NOTIFICATIONS), bit),
            Flags(ALLOW_NOTIFICATIONS | SHOW_ON_LOCK_SCREEN)
        );
    }

    #[test]
    fn preview_policy_follows_lock_screen_then_preview_bits() {
        let a = ALLOW_NOTIFICATIONS;
        assert_eq!(decode_preview_policy(Flags(a)), PreviewPolicy::Always);
        assert_eq!(
            decode_preview_policy(Flags(a | PREVIEW_SUPPRESSED | PREVIEW_ALWAYS)),
            PreviewPolicy::WhenUnlocked
        );
        assert_eq!(
            decode_preview_policy(Flags(a | PREVIEW_SUPPRESSED)),
            PreviewPolicy::Suppressed
        );
        // hidden from the lock screen overrides everything
        assert_eq!(
            decode_preview_policy(Flags(a | SHOW_ON_LOCK_SCREEN)),
            PreviewPolicy::Suppressed
        );
    }

    #[test]
    fn disabling_previews_reads_back_as_suppressed() {
        let a = ALLOW_NOTIFICATIONS;
        for raw in [a, a | PREVIEW_ALWAYS, a | PREVIEW_ALWAYS | PREVIEW_SUPPRESSED] {
            let off = Setting::ShowPreview.encode(false, Flags(raw));
            assert_eq!(decode_preview_policy(off), PreviewPolicy::Suppressed);
            let on = Setting::ShowPreview.encode(true, off);
            assert_eq!(decode_preview_policy(on), PreviewPolicy::Always);
        }
    }

    #[test]
    fn restricted_settings_check_the_bundle_id() {
        assert!(Setting::CriticalAlerts.check_available("com.apple.Home").is_ok());
        assert!(matches!(
            Setting::CriticalAlerts.check_available("com.apple.Safari"),
            Err(NcError::NotSupported { .. })
        ));
        assert!(
            Setting::TimeSensitiveAlerts
                .check_available("com.apple.MobileSMS")
                .is_ok()
        );
        assert!(Setting::BadgeIcon.check_available("anything").is_ok());
    }

    #[test]
    fn disallow_clears_only_the_approval_bit() {
        let before = Flags(ALLOW_NOTIFICATIONS | BADGE_APP_ICON);
        let after = encode_disallow(before);
        assert!(!is_approved(after));
        assert_eq!(after, Flags(BADGE_APP_ICON));
    }
}
