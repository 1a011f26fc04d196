#![forbid(unsafe_code)]

//! Alignment attribute codec.
//!
//! Maps a stored [`AlignAttribute`] to its two persisted forms, the `align`
//! field of the delimiter JSON and the `align{token}` class on the saved
//! root element, and recovers the stored attribute from them.
//!
//! | stored               | effective | field            | class        |
//! |----------------------|-----------|------------------|--------------|
//! | unset, no default    | none      | omitted          | none         |
//! | unset, default `d`   | `d`       | omitted          | `align{d}`   |
//! | `t` (offered, ≠ `d`) | `t`       | `"align":"t"`    | `align{t}`   |
//! | `d`                  | `d`       | omitted          | `align{d}`   |
//! | `null`               | none      | `"align":null`   | none         |
//! | `u`, not offered     | none      | `null` if `d`    | none         |
//!
//! The `null` row is the one asymmetry: clearing a default writes `null` so
//! that loading the markup does not bring the default back, while no
//! `alignnull` class is ever produced.

use serde_json::Value;

use crate::attribute::{AlignAttribute, effective_with};
use crate::config::{AlignmentConfig, EditorSettings};
use crate::html::ClassList;
use crate::markup::Attrs;
use crate::options::OptionSet;
use crate::token::{AlignToken, UnknownToken};

/// Key of the alignment entry in the delimiter attributes.
pub const ALIGN_KEY: &str = "align";

/// The `align` entry as written into delimiter JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignField {
    Omitted,
    Null,
    Token(AlignToken),
}

/// Persisted form of one instance's alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializedAlign {
    pub field: AlignField,
    pub class: Option<AlignToken>,
}

impl SerializedAlign {
    /// Nothing persisted at all.
    pub const NONE: Self = Self {
        field: AlignField::Omitted,
        class: None,
    };

    /// Low-level mapping from an effective value.
    ///
    /// `is_default` marks a value that came from the configured default and
    /// therefore needs no attribute field.
    #[must_use]
    pub fn from_effective(effective: Option<AlignToken>, is_default: bool) -> Self {
        match effective {
            None => Self::NONE,
            Some(token) => Self {
                field: if is_default {
                    AlignField::Omitted
                } else {
                    AlignField::Token(token)
                },
                class: Some(token),
            },
        }
    }

    /// The explicit clear of a default.
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            field: AlignField::Null,
            class: None,
        }
    }

    #[must_use]
    pub fn class_name(&self) -> Option<&'static str> {
        self.class.map(AlignToken::class_name)
    }

    /// Write the field into delimiter attributes, replacing any previous
    /// `align` entry.
    pub fn write_field(&self, attrs: &mut Attrs) {
        match self.field {
            AlignField::Omitted => {
                attrs.remove(ALIGN_KEY);
            }
            AlignField::Null => {
                attrs.insert(ALIGN_KEY.to_string(), Value::Null);
            }
            AlignField::Token(token) => {
                attrs.insert(ALIGN_KEY.to_string(), Value::String(token.as_str().to_string()));
            }
        }
    }
}

/// Serialize a stored attribute for a block type.
#[must_use]
pub fn encode(
    config: &AlignmentConfig,
    stored: AlignAttribute,
    settings: EditorSettings,
) -> SerializedAlign {
    if config.is_absent() {
        return SerializedAlign::NONE;
    }
    match stored {
        AlignAttribute::Null => SerializedAlign::cleared(),
        AlignAttribute::Unset => {
            SerializedAlign::from_effective(effective_with(config, stored, settings), true)
        }
        AlignAttribute::Value(token) => match effective_with(config, stored, settings) {
            // An unoffered token must not let the default come back on reload.
            None if config.default_token().is_some() => SerializedAlign::cleared(),
            None => SerializedAlign::NONE,
            effective => {
                SerializedAlign::from_effective(effective, config.default_token() == Some(token))
            }
        },
    }
}

/// Delimiter attributes that cannot be decoded into an alignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("`align` must be a string or null, found {found}")]
    InvalidValue { found: String },

    #[error(transparent)]
    UnknownToken(#[from] UnknownToken),
}

/// Recover the stored attribute from delimiter attributes and root classes.
///
/// The field wins when present. Without a field, a class naming the
/// configured default means the default was in effect (`Unset`); a class
/// naming another offered token is recovered as that explicit value.
///
/// # Errors
///
/// Returns a [`CodecError`] when the field holds something other than a
/// token string or `null`.
pub fn decode(
    attrs: &Attrs,
    classes: &ClassList,
    config: &AlignmentConfig,
    settings: EditorSettings,
) -> Result<AlignAttribute, CodecError> {
    if config.is_absent() {
        return Ok(AlignAttribute::Unset);
    }
    match attrs.get(ALIGN_KEY) {
        Some(Value::Null) => Ok(AlignAttribute::Null),
        Some(Value::String(raw)) => Ok(AlignAttribute::Value(raw.parse()?)),
        Some(other) => Err(CodecError::InvalidValue {
            found: other.to_string(),
        }),
        None => {
            let options = OptionSet::resolve_with(config, settings);
            for token in classes.alignments() {
                if config.default_token() == Some(token) {
                    return Ok(AlignAttribute::Unset);
                }
                if options.contains(token) {
                    tracing::trace!(
                        message = "align.decode.class_only",
                        token = token.as_str()
                    );
                    return Ok(AlignAttribute::Value(token));
                }
            }
            Ok(AlignAttribute::Unset)
        }
    }
}
