#![forbid(unsafe_code)]

//! Alignment tokens.
//!
//! The token set is closed: every alignment a block can carry is one of
//! [`AlignToken::ALL`]. Each token has three spellings that must stay in
//! lock-step:
//!
//! | token    | attribute value | CSS class     | toolbar label    |
//! |----------|-----------------|---------------|------------------|
//! | `Left`   | `"left"`        | `alignleft`   | `Align left`     |
//! | `Center` | `"center"`      | `aligncenter` | `Align center`   |
//! | `Right`  | `"right"`       | `alignright`  | `Align right`    |
//! | `Wide`   | `"wide"`        | `alignwide`   | `Align wide`     |
//! | `Full`   | `"full"`        | `alignfull`   | `Align full`     |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix shared by every alignment class name.
pub const CLASS_PREFIX: &str = "align";

/// Prefix shared by every alignment toolbar label.
pub const LABEL_PREFIX: &str = "Align ";

/// One alignment option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlignToken {
    Left,
    Center,
    Right,
    /// Only offered when the theme enables wide alignment.
    Wide,
    /// Only offered when the theme enables wide alignment.
    Full,
}

impl AlignToken {
    /// Every token, in canonical toolbar order.
    pub const ALL: [AlignToken; 5] = [
        AlignToken::Left,
        AlignToken::Center,
        AlignToken::Right,
        AlignToken::Wide,
        AlignToken::Full,
    ];

    /// Tokens offered by `align: true` when wide alignment is off.
    pub const BASIC: [AlignToken; 3] = [AlignToken::Left, AlignToken::Center, AlignToken::Right];

    /// Attribute spelling (`"left"`, `"center"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Wide => "wide",
            Self::Full => "full",
        }
    }

    /// CSS class emitted on the saved root element.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Left => "alignleft",
            Self::Center => "aligncenter",
            Self::Right => "alignright",
            Self::Wide => "alignwide",
            Self::Full => "alignfull",
        }
    }

    /// Toolbar control label.
    #[must_use]
    pub fn label(self) -> String {
        format!("{LABEL_PREFIX}{}", self.as_str())
    }

    /// Whether the token needs the theme's wide-alignment opt-in.
    #[must_use]
    pub const fn is_wide(self) -> bool {
        matches!(self, Self::Wide | Self::Full)
    }

    /// Recognise an `align{token}` class. Anything else yields `None`.
    #[must_use]
    pub fn from_class(class: &str) -> Option<Self> {
        class
            .strip_prefix(CLASS_PREFIX)
            .and_then(|rest| rest.parse().ok())
    }

    /// Recognise an `Align {token}` toolbar label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        label
            .strip_prefix(LABEL_PREFIX)
            .and_then(|rest| rest.parse().ok())
    }
}

impl fmt::Display for AlignToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that is not one of the alignment tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alignment token: {0:?}")]
pub struct UnknownToken(pub String);

impl FromStr for AlignToken {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "wide" => Ok(Self::Wide),
            "full" => Ok(Self::Full),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

impl Serialize for AlignToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlignToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
