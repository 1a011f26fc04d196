#![forbid(unsafe_code)]

//! Alignment toolbar projection and toggling.
//!
//! [`project`] turns the offered options and the effective alignment into
//! the list of controls a host renders. [`toggle`] is the pure transition a
//! click on one of those controls causes; hosts translate their own events
//! into a call to it.
//!
//! # Transitions
//!
//! - clicking the pressed control clears it: `null` when the block type has
//!   a default (so the default stays suppressed), unset otherwise
//! - clicking any other control stores that token

use crate::attribute::{AlignAttribute, effective_with};
use crate::config::{AlignmentConfig, EditorSettings};
use crate::options::OptionSet;
use crate::token::AlignToken;

/// One rendered alignment control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarButton {
    pub token: AlignToken,
    pub label: String,
    pub pressed: bool,
}

/// Controls for an instance, in option order. At most one is pressed.
#[must_use]
pub fn project(options: &OptionSet, effective: Option<AlignToken>) -> Vec<ToolbarButton> {
    options
        .iter()
        .map(|token| ToolbarButton {
            token,
            label: token.label(),
            pressed: effective == Some(token),
        })
        .collect()
}

/// Controls for a block type and stored attribute.
#[must_use]
pub fn project_for(
    config: &AlignmentConfig,
    stored: AlignAttribute,
    settings: EditorSettings,
) -> Vec<ToolbarButton> {
    project(
        &OptionSet::resolve_with(config, settings),
        effective_with(config, stored, settings),
    )
}

/// A click that the alignment toolbar could never have produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToggleError {
    #[error("alignment toggled on a block type without alignment support")]
    AbsentCapability,

    #[error("alignment `{token}` is not offered by this block type")]
    NotOffered { token: AlignToken },
}

/// New stored attribute after `clicked` is pressed.
///
/// # Errors
///
/// [`ToggleError::AbsentCapability`] for block types without alignment and
/// [`ToggleError::NotOffered`] for tokens outside the option set. Neither is
/// reachable through [`project`] output.
pub fn toggle(
    config: &AlignmentConfig,
    stored: AlignAttribute,
    clicked: AlignToken,
    settings: EditorSettings,
) -> Result<AlignAttribute, ToggleError> {
    if config.is_absent() {
        return Err(ToggleError::AbsentCapability);
    }
    if !OptionSet::resolve_with(config, settings).contains(clicked) {
        return Err(ToggleError::NotOffered { token: clicked });
    }

    if effective_with(config, stored, settings) == Some(clicked) {
        Ok(if config.default_token().is_some() {
            AlignAttribute::Null
        } else {
            AlignAttribute::Unset
        })
    } else {
        Ok(AlignAttribute::Value(clicked))
    }
}
