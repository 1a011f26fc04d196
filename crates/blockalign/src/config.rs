#![forbid(unsafe_code)]

//! Per-block-type alignment configuration.
//!
//! An [`AlignmentConfig`] is what a block type author declares: whether the
//! block supports alignment at all, which tokens it offers, and which token
//! applies when nothing is stored. It is fixed once the block type is
//! registered; [`AlignmentConfig::validate`] is the registration-time check.
//!
//! Manifests spell the capability the way block authors do:
//!
//! ```toml
//! align = true                  # every basic token
//! align = ["left", "center"]    # an explicit list
//! align = false                 # same as leaving it out
//! default_align = "right"
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::options::OptionSet;
use crate::token::AlignToken;

/// Editor-wide settings that influence option resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// The active theme opts into `wide` and `full` alignment.
    pub wide_alignment: bool,
}

/// Which tokens a block type offers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AlignSupport {
    /// No alignment capability.
    #[default]
    Absent,
    /// `align: true`.
    All,
    /// An explicit, ordered, duplicate-free list.
    Only(SmallVec<[AlignToken; 5]>),
}

/// Alignment declaration of one block type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentConfig {
    support: AlignSupport,
    default: Option<AlignToken>,
}

impl AlignmentConfig {
    /// A block type without alignment.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            support: AlignSupport::Absent,
            default: None,
        }
    }

    /// `align: true`.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            support: AlignSupport::All,
            default: None,
        }
    }

    /// An explicit token list. Later duplicates are dropped.
    #[must_use]
    pub fn only(tokens: impl IntoIterator<Item = AlignToken>) -> Self {
        let mut list: SmallVec<[AlignToken; 5]> = SmallVec::new();
        for token in tokens {
            if !list.contains(&token) {
                list.push(token);
            }
        }
        Self {
            support: AlignSupport::Only(list),
            default: None,
        }
    }

    /// Declare the token applied when nothing is stored.
    ///
    /// Not checked here; see [`AlignmentConfig::validate`].
    #[must_use]
    pub fn with_default(mut self, token: AlignToken) -> Self {
        self.default = Some(token);
        self
    }

    #[must_use]
    pub const fn support(&self) -> &AlignSupport {
        &self.support
    }

    #[must_use]
    pub const fn default_token(&self) -> Option<AlignToken> {
        self.default
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self.support, AlignSupport::Absent)
    }

    /// Registration-time check against the editor settings.
    ///
    /// # Errors
    ///
    /// - a default on a block without alignment
    /// - an explicit list that resolves to no options
    /// - a default that is not among the resolved options
    pub fn validate(&self, block: &str, settings: EditorSettings) -> Result<(), ConfigurationError> {
        if self.is_absent() {
            return match self.default {
                Some(default) => Err(ConfigurationError::DefaultWithoutCapability {
                    block: block.to_string(),
                    default,
                }),
                None => Ok(()),
            };
        }

        let options = OptionSet::resolve_with(self, settings);
        if options.is_empty() {
            return Err(ConfigurationError::NoOptionsOffered {
                block: block.to_string(),
            });
        }
        if let Some(default) = self.default
            && !options.contains(default)
        {
            return Err(ConfigurationError::DefaultNotOffered {
                block: block.to_string(),
                default,
                offered: options.iter().collect(),
            });
        }
        Ok(())
    }

    /// Build a config from its manifest spelling.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownOption`] or
    /// [`ConfigurationError::UnknownDefault`] for strings outside the token
    /// set. Consistency between list and default is left to
    /// [`AlignmentConfig::validate`].
    pub fn from_declaration(
        block: &str,
        align: Option<&AlignDeclaration>,
        default_align: Option<&str>,
    ) -> Result<Self, ConfigurationError> {
        let mut config = match align {
            None | Some(AlignDeclaration::Flag(false)) => Self::absent(),
            Some(AlignDeclaration::Flag(true)) => Self::all(),
            Some(AlignDeclaration::Tokens(raw)) => {
                let mut tokens = Vec::with_capacity(raw.len());
                for name in raw {
                    let token = name.parse::<AlignToken>().map_err(|_| {
                        ConfigurationError::UnknownOption {
                            block: block.to_string(),
                            token: name.clone(),
                        }
                    })?;
                    tokens.push(token);
                }
                Self::only(tokens)
            }
        };
        if let Some(name) = default_align {
            let token = name
                .parse::<AlignToken>()
                .map_err(|_| ConfigurationError::UnknownDefault {
                    block: block.to_string(),
                    token: name.to_string(),
                })?;
            config = config.with_default(token);
        }
        Ok(config)
    }

    /// Manifest spelling of the capability, the inverse of
    /// [`AlignmentConfig::from_declaration`].
    #[must_use]
    pub fn declaration(&self) -> Option<AlignDeclaration> {
        match &self.support {
            AlignSupport::Absent => None,
            AlignSupport::All => Some(AlignDeclaration::Flag(true)),
            AlignSupport::Only(list) => Some(AlignDeclaration::Tokens(
                list.iter().map(|t| t.as_str().to_string()).collect(),
            )),
        }
    }
}

/// Manifest form of `align`: a flag or a list of token names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlignDeclaration {
    Flag(bool),
    Tokens(Vec<String>),
}

/// A block type declaration that cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("block `{block}` declares unknown alignment option {token:?}")]
    UnknownOption { block: String, token: String },

    #[error("block `{block}` declares unknown default alignment {token:?}")]
    UnknownDefault { block: String, token: String },

    #[error("block `{block}` declares default alignment `{default}` but has no alignment support")]
    DefaultWithoutCapability { block: String, default: AlignToken },

    #[error("block `{block}` declares default alignment `{default}` outside its options {offered:?}")]
    DefaultNotOffered {
        block: String,
        default: AlignToken,
        offered: Vec<AlignToken>,
    },

    #[error("block `{block}` declares alignment support but offers no options")]
    NoOptionsOffered { block: String },

    #[error("block name `{name}` is not of the form `namespace/name`")]
    InvalidName { name: String },

    #[error("block `{name}` is already registered")]
    DuplicateBlock { name: String },

    #[error("block `{block}` saves into invalid element tag {tag:?}")]
    InvalidTag { block: String, tag: String },

    #[error("block `{block}` content {content:?} must not contain `<`")]
    InvalidContent { block: String, content: String },
}
