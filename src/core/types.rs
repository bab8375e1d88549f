// SPDX-License-Identifier: MIT

//! This module defines the types decoded from a Notification Center app record.
//!
//! Every enumerated setting parses from the token accepted on the command line
//! (`FromStr`, failing with [`NcError::BadArgument`]) and converts from the
//! integer stored by macOS (`TryFrom<i64>`, failing with [`NcError::CorruptState`]).

use std::{fmt, str::FromStr};

use crate::core::error::NcError;

/// Packed notification flags of one app record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(pub u64);

impl Flags {
    pub fn contains(self, mask: u64) -> bool {
        self.0 & mask != 0
    }

    pub fn with(self, mask: u64) -> Self {
        Flags(self.0 | mask)
    }

    pub fn without(self, mask: u64) -> Self {
        Flags(self.0 & !mask)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#b})", self.0, self.0)
    }
}

/// "Alert style" as shown in System Settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStyle {
    None,
    Banners,
    Alerts,
}

impl FromStr for AlertStyle {
    type Err = NcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alerts" => Ok(AlertStyle::Alerts),
            "banners" => Ok(AlertStyle::Banners),
            "none" => Ok(AlertStyle::None),
            other => Err(NcError::bad_argument(other, "alerts, banners, none")),
        }
    }
}

impl fmt::Display for AlertStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlertStyle::None => "None",
            AlertStyle::Banners => "Banners",
            AlertStyle::Alerts => "Alerts",
        })
    }
}

/// The `enable`/`disable` selector of boolean set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Enable,
    Disable,
}

impl Toggle {
    pub fn is_enable(self) -> bool {
        self == Toggle::Enable
    }
}

impl FromStr for Toggle {
    type Err = NcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable" => Ok(Toggle::Enable),
            "disable" => Ok(Toggle::Disable),
            other => Err(NcError::bad_argument(other, "enable, disable")),
        }
    }
}

/// "Show previews", stored as `content_visibility` both per app and globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentVisibility {
    Never,
    WhenUnlocked,
    Always,
}

impl ContentVisibility {
    pub fn raw(self) -> i64 {
        match self {
            ContentVisibility::Never => 1,
            ContentVisibility::WhenUnlocked => 2,
            ContentVisibility::Always => 3,
        }
    }
}

impl TryFrom<i64> for ContentVisibility {
    type Error = NcError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ContentVisibility::Never),
            2 => Ok(ContentVisibility::WhenUnlocked),
            3 => Ok(ContentVisibility::Always),
            _ => Err(NcError::CorruptState {
                field: "content_visibility",
                value,
            }),
        }
    }
}

impl FromStr for ContentVisibility {
    type Err = NcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(ContentVisibility::Always),
            "unlocked" => Ok(ContentVisibility::WhenUnlocked),
            "never" => Ok(ContentVisibility::Never),
            other => Err(NcError::bad_argument(other, "always, unlocked, never")),
        }
    }
}

impl fmt::Display for ContentVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentVisibility::Never => "Never",
            ContentVisibility::WhenUnlocked => "WhenUnlocked",
            ContentVisibility::Always => "Always",
        })
    }
}

/// "Notification grouping".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Automatic,
    ByApp,
    Off,
}

impl Grouping {
    pub fn raw(self) -> i64 {
        match self {
            Grouping::Automatic => 0,
            Grouping::ByApp => 1,
            Grouping::Off => 2,
        }
    }
}

impl TryFrom<i64> for Grouping {
    type Error = NcError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Grouping::Automatic),
            1 => Ok(Grouping::ByApp),
            2 => Ok(Grouping::Off),
            _ => Err(NcError::CorruptState {
                field: "grouping",
                value,
            }),
        }
    }
}

impl FromStr for Grouping {
    type Err = NcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(Grouping::Automatic),
            "byapp" => Ok(Grouping::ByApp),
            "off" => Ok(Grouping::Off),
            other => Err(NcError::bad_argument(other, "automatic, byapp, off")),
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grouping::Automatic => "Automatic",
            Grouping::ByApp => "ByApp",
            Grouping::Off => "Off",
        })
    }
}

/// Preview behaviour derived from the lock-screen and preview bits of `flags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPolicy {
    Always,
    WhenUnlocked,
    Suppressed,
}

impl fmt::Display for PreviewPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreviewPolicy::Always => "Always",
            PreviewPolicy::WhenUnlocked => "WhenUnlocked",
            PreviewPolicy::Suppressed => "Suppressed",
        })
    }
}

/// One decoded entry of the `apps` array.
///
/// `grouping` and `content_visibility` stay raw so that a corrupt value only
/// fails the operation that reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    pub bundle_id: String,
    pub flags: Flags,
    pub grouping: i64,
    pub content_visibility: i64,
}

/// A single-field replacement applied to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Flags(Flags),
    Grouping(Grouping),
    ContentVisibility(ContentVisibility),
}

impl Field {
    /// Dictionary key of the field inside an app record.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Flags(_) => "flags",
            Field::Grouping(_) => "grouping",
            Field::ContentVisibility(_) => "content_visibility",
        }
    }

    pub fn plist_value(&self) -> plist::Value {
        match *self {
            Field::Flags(flags) => plist::Value::Integer(flags.0.into()),
            Field::Grouping(g) => plist::Value::Integer(g.raw().into()),
            Field::ContentVisibility(cv) => plist::Value::Integer(cv.raw().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokens_parse_to_enums() {
        assert_eq!("alerts".parse::<AlertStyle>().ok(), Some(AlertStyle::Alerts));
        assert_eq!("none".parse::<AlertStyle>().ok(), Some(AlertStyle::None));
        assert_eq!("disable".parse::<Toggle>().ok(), Some(Toggle::Disable));
        assert_eq!(
            "unlocked".parse::<ContentVisibility>().ok(),
            Some(ContentVisibility::WhenUnlocked)
        );
        assert_eq!("byapp".parse::<Grouping>().ok(), Some(Grouping::ByApp));
    }

    #[test]
    fn unknown_tokens_are_bad_arguments() {
        for err in [
            "Alerts".parse::<AlertStyle>().err(),
            "on".parse::<Toggle>().err(),
            "sometimes".parse::<ContentVisibility>().err(),
            "by-app".parse::<Grouping>().err(),
        ] {
            assert!(matches!(err, Some(NcError::BadArgument { .. })), "{err:?}");
        }
    }

    #[test]
    fn content_visibility_rejects_out_of_range() {
        for raw in [1, 2, 3] {
            let cv = ContentVisibility::try_from(raw);
            assert_eq!(cv.ok().map(ContentVisibility::raw), Some(raw));
        }
        for raw in [-1, 0, 4, 99] {
            assert!(matches!(
                ContentVisibility::try_from(raw),
                Err(NcError::CorruptState { field: "content_visibility", value }) if value == raw
            ));
        }
    }

    #[test]
    fn grouping_rejects_out_of_range() {
        for raw in [0, 1, 2] {
            assert_eq!(Grouping::try_from(raw).ok().map(Grouping::raw), Some(raw));
        }
        for raw in [-1, 3, 7] {
            assert!(matches!(
                Grouping::try_from(raw),
                Err(NcError::CorruptState { field: "grouping", .. })
            ));
        }
    }

    #[test]
    fn field_maps_to_record_key_and_integer() {
        let field = Field::ContentVisibility(ContentVisibility::Always);
        assert_eq!(field.key(), "content_visibility");
        assert_eq!(field.plist_value().as_signed_integer(), Some(3));

        let field = Field::Flags(Flags(1 << 25));
        assert_eq!(field.key(), "flags");
        assert_eq!(field.plist_value().as_unsigned_integer(), Some(1 << 25));
    }
}
