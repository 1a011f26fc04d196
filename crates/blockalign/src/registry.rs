#![forbid(unsafe_code)]

//! Registered block types.

use crate::attribute::{AlignAttribute, effective_with};
use crate::codec;
use crate::config::{AlignmentConfig, ConfigurationError, EditorSettings};
use crate::html::{RootElement, is_valid_tag_name};
use crate::markup::{block_class_name, is_valid_block_name};
use crate::options::OptionSet;
use crate::token::AlignToken;

/// A block type: identity, alignment capability and save output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockType {
    name: String,
    title: String,
    alignment: AlignmentConfig,
    tag: String,
    content: String,
}

impl BlockType {
    /// Saves `<div>` with the title as content until told otherwise.
    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            name: name.into(),
            content: title.clone(),
            title,
            alignment: AlignmentConfig::absent(),
            tag: "div".to_string(),
        }
    }

    #[must_use]
    pub fn alignment(mut self, config: AlignmentConfig) -> Self {
        self.alignment = config;
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn alignment_config(&self) -> &AlignmentConfig {
        &self.alignment
    }

    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn content_text(&self) -> &str {
        &self.content
    }

    /// Generated root class (`wp-block-...`).
    #[must_use]
    pub fn class_name(&self) -> String {
        block_class_name(&self.name)
    }

    #[must_use]
    pub fn options(&self, settings: EditorSettings) -> OptionSet {
        OptionSet::resolve_with(&self.alignment, settings)
    }

    #[must_use]
    pub fn effective(&self, stored: AlignAttribute, settings: EditorSettings) -> Option<AlignToken> {
        effective_with(&self.alignment, stored, settings)
    }

    /// Root element saved for the given alignment.
    #[must_use]
    pub fn save(&self, stored: AlignAttribute, settings: EditorSettings) -> RootElement {
        let mut root = RootElement::new(self.tag.clone()).with_text(self.content.clone());
        root.classes.push(self.class_name());
        if let Some(class) = codec::encode(&self.alignment, stored, settings).class_name() {
            root.classes.push(class);
        }
        root
    }
}

/// All block types known to an editor session.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    settings: EditorSettings,
    types: Vec<BlockType>,
}

impl BlockRegistry {
    #[must_use]
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            settings,
            types: Vec::new(),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> EditorSettings {
        self.settings
    }

    /// Register a block type after validating its declaration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for malformed names, duplicate names,
    /// a save output that would not parse back (bad tag, `<` in content)
    /// and inconsistent alignment declarations; nothing is registered then.
    /// The tag is stored lowercase.
    pub fn register(&mut self, mut block: BlockType) -> Result<(), ConfigurationError> {
        if !is_valid_block_name(&block.name) {
            return Err(ConfigurationError::InvalidName { name: block.name });
        }
        if self.get(&block.name).is_some() {
            return Err(ConfigurationError::DuplicateBlock { name: block.name });
        }
        if !is_valid_tag_name(&block.tag) {
            return Err(ConfigurationError::InvalidTag {
                block: block.name,
                tag: block.tag,
            });
        }
        if block.content.contains('<') {
            return Err(ConfigurationError::InvalidContent {
                block: block.name,
                content: block.content,
            });
        }
        block.tag.make_ascii_lowercase();
        block.alignment.validate(&block.name, self.settings)?;
        tracing::debug!(
            message = "registry.register",
            block = block.name.as_str(),
            wide_alignment = self.settings.wide_alignment,
        );
        self.types.push(block);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BlockType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Look up by name, falling back to title.
    #[must_use]
    pub fn find(&self, name_or_title: &str) -> Option<&BlockType> {
        self.get(name_or_title)
            .or_else(|| self.types.iter().find(|t| t.title == name_or_title))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
