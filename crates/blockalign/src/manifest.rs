#![forbid(unsafe_code)]

//! Plugin manifests: editor settings plus block type declarations.
//!
//! ```toml
//! [editor]
//! wide_alignment = false
//!
//! [[blocks]]
//! name = "test/test-align-array"
//! title = "Test Align Array"
//! align = ["left", "center"]
//!
//! [[blocks]]
//! name = "test/test-default-align"
//! title = "Test Default Align"
//! align = true
//! default_align = "right"
//! ```
//!
//! Loading only deserializes; [`PluginManifest::build_registry`] performs the
//! registration-time validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{AlignDeclaration, AlignmentConfig, ConfigurationError, EditorSettings};
use crate::registry::{BlockRegistry, BlockType};
use crate::token::AlignToken;

/// One declared block type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDeclaration {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<AlignDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Saved text; the title when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl BlockDeclaration {
    /// Build the block type this declaration describes.
    ///
    /// # Errors
    ///
    /// Unknown alignment tokens.
    pub fn to_block_type(&self) -> Result<BlockType, ConfigurationError> {
        let config = AlignmentConfig::from_declaration(
            &self.name,
            self.align.as_ref(),
            self.default_align.as_deref(),
        )?;
        let mut block = BlockType::new(self.name.clone(), self.title.clone()).alignment(config);
        if let Some(tag) = &self.tag {
            block = block.tag(tag.clone());
        }
        if let Some(content) = &self.content {
            block = block.content(content.clone());
        }
        Ok(block)
    }
}

/// Editor settings and the block types a plugin registers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginManifest {
    pub editor: EditorSettings,
    pub blocks: Vec<BlockDeclaration>,
}

/// A manifest that cannot be loaded or registered.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl PluginManifest {
    /// # Errors
    ///
    /// [`ManifestError::Toml`] when `s` is not a valid TOML manifest.
    pub fn from_toml_str(s: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(s)?)
    }

    /// # Errors
    ///
    /// [`ManifestError::Json`] when `s` is not a valid JSON manifest.
    pub fn from_json_str(s: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from disk; `.json` files are read as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// [`ManifestError::Io`] when the file cannot be read, otherwise the
    /// parse error of the chosen format.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    ///
    /// Propagates [`toml::ser::Error`]; declarations built from a parsed
    /// manifest always serialize.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Validate and register every declared block type, in order.
    ///
    /// # Errors
    ///
    /// The first [`ConfigurationError`] encountered.
    pub fn build_registry(&self) -> Result<BlockRegistry, ManifestError> {
        let mut registry = BlockRegistry::new(self.editor);
        for declaration in &self.blocks {
            registry.register(declaration.to_block_type()?)?;
        }
        tracing::debug!(message = "manifest.registered", blocks = registry.len());
        Ok(registry)
    }

    /// The align-hook test plugin: one block type per alignment declaration
    /// shape.
    #[must_use]
    pub fn align_hook_fixture() -> Self {
        let declare = |name: &str, title: &str, align: Option<AlignDeclaration>, default: Option<AlignToken>| {
            BlockDeclaration {
                name: name.to_string(),
                title: title.to_string(),
                align,
                default_align: default.map(|t| t.as_str().to_string()),
                tag: None,
                content: None,
            }
        };
        Self {
            editor: EditorSettings::default(),
            blocks: vec![
                declare("test/test-no-alignment-set", "Test No Alignment Set", None, None),
                declare(
                    "test/test-align-true",
                    "Test Align True",
                    Some(AlignDeclaration::Flag(true)),
                    None,
                ),
                declare(
                    "test/test-align-array",
                    "Test Align Array",
                    Some(AlignDeclaration::Tokens(vec![
                        "left".to_string(),
                        "center".to_string(),
                    ])),
                    None,
                ),
                declare(
                    "test/test-default-align",
                    "Test Default Align",
                    Some(AlignDeclaration::Flag(true)),
                    Some(AlignToken::Right),
                ),
            ],
        }
    }
}
