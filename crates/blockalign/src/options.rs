#![forbid(unsafe_code)]

//! Option set resolution.
//!
//! Turns an [`AlignmentConfig`] into the ordered list of tokens a block
//! instance offers. Order is significant: toolbar controls are emitted in
//! exactly this order.
//!
//! # Invariants
//!
//! - `resolve(absent)` is empty, and the set is empty only for `absent`
//!   (registration rejects declarations that would resolve to nothing).
//! - `resolve(true)` is `[left, center, right]` unless the theme enables
//!   wide alignment, in which case `wide` and `full` follow.
//! - No token appears twice.

use smallvec::SmallVec;

use crate::config::{AlignSupport, AlignmentConfig, EditorSettings};
use crate::token::AlignToken;

/// Ordered, duplicate-free set of offered alignment tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    tokens: SmallVec<[AlignToken; 5]>,
}

impl OptionSet {
    /// Resolve with default editor settings (no wide alignment).
    #[must_use]
    pub fn resolve(config: &AlignmentConfig) -> Self {
        Self::resolve_with(config, EditorSettings::default())
    }

    /// Resolve against explicit editor settings.
    #[must_use]
    pub fn resolve_with(config: &AlignmentConfig, settings: EditorSettings) -> Self {
        let allowed = |token: &AlignToken| settings.wide_alignment || !token.is_wide();
        let tokens = match config.support() {
            AlignSupport::Absent => SmallVec::new(),
            AlignSupport::All => AlignToken::ALL.iter().copied().filter(allowed).collect(),
            AlignSupport::Only(list) => list.iter().copied().filter(allowed).collect(),
        };
        Self { tokens }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn contains(&self, token: AlignToken) -> bool {
        self.tokens.contains(&token)
    }

    pub fn iter(&self) -> impl Iterator<Item = AlignToken> + '_ {
        self.tokens.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[AlignToken] {
        &self.tokens
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = AlignToken;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, AlignToken>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter().copied()
    }
}
