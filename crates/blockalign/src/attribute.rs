#![forbid(unsafe_code)]

//! Stored alignment attribute and effective-value resolution.
//!
//! The stored attribute distinguishes three cases that must never be
//! collapsed:
//!
//! - [`AlignAttribute::Unset`]: nothing stored; the configured default (if
//!   any) applies.
//! - [`AlignAttribute::Null`]: stored `null`; the user cleared the default.
//! - [`AlignAttribute::Value`]: an explicit token.
//!
//! Folding `Null` into `Unset` would bring a cleared default back on the next
//! load.

use std::fmt;

use crate::config::{AlignmentConfig, EditorSettings};
use crate::options::OptionSet;
use crate::token::AlignToken;

/// The `align` entry of a block's attribute bag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlignAttribute {
    #[default]
    Unset,
    Null,
    Value(AlignToken),
}

impl AlignAttribute {
    #[must_use]
    pub const fn is_unset(self) -> bool {
        matches!(self, Self::Unset)
    }

    #[must_use]
    pub const fn token(self) -> Option<AlignToken> {
        match self {
            Self::Value(token) => Some(token),
            Self::Unset | Self::Null => None,
        }
    }
}

impl fmt::Display for AlignAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("unset"),
            Self::Null => f.write_str("null"),
            Self::Value(token) => write!(f, "\"{token}\""),
        }
    }
}

/// Effective alignment of an instance, using default editor settings.
#[must_use]
pub fn effective(config: &AlignmentConfig, stored: AlignAttribute) -> Option<AlignToken> {
    effective_with(config, stored, EditorSettings::default())
}

/// Effective alignment of an instance.
///
/// A stored token the block does not offer has no effect.
#[must_use]
pub fn effective_with(
    config: &AlignmentConfig,
    stored: AlignAttribute,
    settings: EditorSettings,
) -> Option<AlignToken> {
    if config.is_absent() {
        return None;
    }
    match stored {
        AlignAttribute::Value(token) => {
            OptionSet::resolve_with(config, settings)
                .contains(token)
                .then_some(token)
        }
        AlignAttribute::Null => None,
        AlignAttribute::Unset => config.default_token(),
    }
}

/// Lifecycle state of one instance's alignment.
///
/// `Cleared` is only reachable from `Default`: a stored `null` on a block
/// type without a default behaves exactly like `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignState {
    Unset,
    Default(AlignToken),
    Explicit(AlignToken),
    Cleared,
}

impl AlignState {
    /// Classify a stored attribute, using default editor settings.
    #[must_use]
    pub fn classify(config: &AlignmentConfig, stored: AlignAttribute) -> Self {
        Self::classify_with(config, stored, EditorSettings::default())
    }

    /// Classify a stored attribute.
    ///
    /// An explicit value equal to the default persists exactly like the
    /// default itself, so it is reported as `Default`. A stored token the
    /// block does not offer has no effect and classifies like `null`.
    #[must_use]
    pub fn classify_with(
        config: &AlignmentConfig,
        stored: AlignAttribute,
        settings: EditorSettings,
    ) -> Self {
        if config.is_absent() {
            return Self::Unset;
        }
        let stored = match stored {
            AlignAttribute::Value(token)
                if !OptionSet::resolve_with(config, settings).contains(token) =>
            {
                AlignAttribute::Null
            }
            other => other,
        };
        let default = config.default_token();
        match (stored, default) {
            (AlignAttribute::Unset, Some(token)) => Self::Default(token),
            (AlignAttribute::Unset, None) => Self::Unset,
            (AlignAttribute::Null, Some(_)) => Self::Cleared,
            (AlignAttribute::Null, None) => Self::Unset,
            (AlignAttribute::Value(token), Some(d)) if token == d => Self::Default(token),
            (AlignAttribute::Value(token), _) => Self::Explicit(token),
        }
    }

    /// Initial state of a freshly inserted instance.
    #[must_use]
    pub fn initial(config: &AlignmentConfig) -> Self {
        Self::classify(config, AlignAttribute::Unset)
    }
}
