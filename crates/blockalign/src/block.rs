#![forbid(unsafe_code)]

//! Block instances.
//!
//! An instance is created either by insertion (fresh attributes, always
//! valid) or by interpreting a [`RawBlock`] from markup. Interpretation
//! decodes the alignment, re-saves the block from the recovered attributes
//! and compares the result with the stored root element; any difference
//! marks the instance invalid. Invalid and freeform instances keep their
//! source so serialization can emit it untouched.

use std::fmt;

use crate::attribute::{AlignAttribute, AlignState};
use crate::codec::{self, CodecError};
use crate::config::{AlignmentConfig, EditorSettings};
use crate::html::RootElement;
use crate::markup::{Attrs, RawBlock, serialize_block};
use crate::registry::{BlockRegistry, BlockType};

/// Name given to content outside any block delimiter.
pub const FREEFORM_BLOCK: &str = "core/freeform";

/// Session-unique identity of a block instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl ClientId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// Attribute bag of an instance.
///
/// `align` is typed; every other delimiter attribute is carried through
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockAttributes {
    pub align: AlignAttribute,
    pub other: Attrs,
}

impl BlockAttributes {
    /// Delimiter attributes for a block type.
    #[must_use]
    pub fn to_delimiter_attrs(&self, block: &BlockType, settings: EditorSettings) -> Attrs {
        let mut attrs = self.other.clone();
        codec::encode(block.alignment_config(), self.align, settings).write_field(&mut attrs);
        attrs
    }
}

/// Why an interpreted block is not valid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("block type `{name}` is not registered")]
    UnknownBlockType { name: String },

    #[error("attributes do not decode: {0}")]
    Attributes(#[from] CodecError),

    #[error("saved content differs: expected `{expected}`, found `{found}`")]
    ContentMismatch { expected: String, found: String },
}

/// One block in an editor session.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInstance {
    client_id: ClientId,
    name: String,
    attributes: BlockAttributes,
    invalid: Option<InvalidReason>,
    source: Option<String>,
}

impl BlockInstance {
    /// Fresh instance of a registered type.
    #[must_use]
    pub fn inserted(client_id: ClientId, block: &BlockType) -> Self {
        Self {
            client_id,
            name: block.name().to_string(),
            attributes: BlockAttributes::default(),
            invalid: None,
            source: None,
        }
    }

    /// Instance recovered from markup.
    #[must_use]
    pub fn interpret(client_id: ClientId, raw: &RawBlock, registry: &BlockRegistry) -> Self {
        let Some(name) = raw.name.as_deref() else {
            return Self {
                client_id,
                name: FREEFORM_BLOCK.to_string(),
                attributes: BlockAttributes::default(),
                invalid: None,
                source: Some(raw.source.clone()),
            };
        };

        let mut instance = Self {
            client_id,
            name: name.to_string(),
            attributes: BlockAttributes {
                align: AlignAttribute::Unset,
                other: raw.attrs.clone(),
            },
            invalid: None,
            source: Some(raw.source.clone()),
        };
        instance.attributes.other.remove(codec::ALIGN_KEY);

        let Some(block) = registry.get(name) else {
            instance.invalid = Some(InvalidReason::UnknownBlockType {
                name: name.to_string(),
            });
            return instance;
        };
        let settings = registry.settings();

        let found = RootElement::parse(&raw.inner_html);
        let classes = found
            .as_ref()
            .map(|root| root.classes.clone())
            .unwrap_or_default();
        match codec::decode(&raw.attrs, &classes, block.alignment_config(), settings) {
            Ok(align) => instance.attributes.align = align,
            Err(err) => {
                instance.invalid = Some(InvalidReason::Attributes(err));
                return instance;
            }
        }

        let expected = block.save(instance.attributes.align, settings);
        match found {
            Some(root) if root.equivalent(&expected) => {
                instance.source = None;
            }
            _ => {
                instance.invalid = Some(InvalidReason::ContentMismatch {
                    expected: expected.to_string(),
                    found: raw.inner_html.trim().to_string(),
                });
            }
        }
        instance
    }

    #[must_use]
    pub const fn client_id(&self) -> ClientId {
        self.client_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn attributes(&self) -> &BlockAttributes {
        &self.attributes
    }

    #[must_use]
    pub const fn align(&self) -> AlignAttribute {
        self.attributes.align
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    #[must_use]
    pub const fn invalid_reason(&self) -> Option<&InvalidReason> {
        self.invalid.as_ref()
    }

    #[must_use]
    pub fn is_freeform(&self) -> bool {
        self.name == FREEFORM_BLOCK
    }

    /// Lifecycle state of this instance's alignment.
    #[must_use]
    pub fn align_state(&self, registry: &BlockRegistry) -> AlignState {
        let config = registry
            .get(&self.name)
            .map_or_else(AlignmentConfig::absent, |b| b.alignment_config().clone());
        AlignState::classify_with(&config, self.attributes.align, registry.settings())
    }

    /// Replace the stored alignment. Edits drop any preserved source.
    pub(crate) fn set_align(&mut self, align: AlignAttribute) {
        self.attributes.align = align;
        self.source = None;
    }

    /// Markup for this instance.
    ///
    /// Valid registered blocks are re-saved from their attributes; freeform
    /// and invalid blocks are emitted exactly as they were read.
    #[must_use]
    pub fn serialize(&self, registry: &BlockRegistry) -> String {
        if let Some(source) = &self.source {
            return source.clone();
        }
        let Some(block) = registry.get(&self.name) else {
            return String::new();
        };
        let settings = registry.settings();
        let attrs = self.attributes.to_delimiter_attrs(block, settings);
        let inner = block.save(self.attributes.align, settings).to_string();
        serialize_block(block.name(), &attrs, &inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_document;
    use crate::token::AlignToken;
    use serde_json::json;

    fn registry() -> BlockRegistry {
        let mut registry = BlockRegistry::default();
        registry
            .register(
                BlockType::new("test/test-align-true", "Test Align True")
                    .alignment(AlignmentConfig::all()),
            )
            .unwrap();
        registry
            .register(
                BlockType::new("test/test-default-align", "Test Default Align")
                    .alignment(AlignmentConfig::all().with_default(AlignToken::Right)),
            )
            .unwrap();
        registry
    }

    fn interpret_one(markup: &str) -> BlockInstance {
        let blocks = parse_document(markup).unwrap();
        assert_eq!(blocks.len(), 1);
        BlockInstance::interpret(ClientId(1), &blocks[0], &registry())
    }

    #[test]
    fn client_id_display() {
        assert_eq!(ClientId::new(7).to_string(), "block-7");
        assert_eq!(ClientId(7).raw(), 7);
    }

    #[test]
    fn interprets_valid_explicit_alignment() {
        let instance = interpret_one(
            "<!-- wp:test/test-align-true {\"align\":\"right\"} -->\n\
             <div class=\"wp-block-test-test-align-true alignright\">Test Align True</div>\n\
             <!-- /wp:test/test-align-true -->",
        );
        assert!(instance.is_valid(), "{:?}", instance.invalid_reason());
        assert_eq!(instance.align(), AlignAttribute::Value(AlignToken::Right));
    }

    #[test]
    fn missing_class_is_invalid() {
        let instance = interpret_one(
            "<!-- wp:test/test-align-true {\"align\":\"right\"} -->\n\
             <div class=\"wp-block-test-test-align-true\">Test Align True</div>\n\
             <!-- /wp:test/test-align-true -->",
        );
        assert!(matches!(
            instance.invalid_reason(),
            Some(InvalidReason::ContentMismatch { .. })
        ));
    }

    #[test]
    fn default_markup_is_valid() {
        let instance = interpret_one(
            "<!-- wp:test/test-default-align -->\n\
             <div class=\"wp-block-test-test-default-align alignright\">Test Default Align</div>\n\
             <!-- /wp:test/test-default-align -->",
        );
        assert!(instance.is_valid());
        assert_eq!(instance.align(), AlignAttribute::Unset);
    }

    #[test]
    fn unknown_type_and_bad_attributes_are_invalid() {
        let unknown = interpret_one("<!-- wp:test/other /-->");
        assert!(matches!(
            unknown.invalid_reason(),
            Some(InvalidReason::UnknownBlockType { .. })
        ));
        assert_eq!(unknown.serialize(&registry()), "<!-- wp:test/other /-->");

        let bad = interpret_one(
            "<!-- wp:test/test-align-true {\"align\":true} -->\n<div>x</div>\n<!-- /wp:test/test-align-true -->",
        );
        assert!(matches!(
            bad.invalid_reason(),
            Some(InvalidReason::Attributes(_))
        ));
    }

    #[test]
    fn freeform_is_valid_and_preserved() {
        let instance = interpret_one("<p>loose</p>");
        assert!(instance.is_freeform());
        assert!(instance.is_valid());
        assert_eq!(instance.serialize(&registry()), "<p>loose</p>");
    }

    #[test]
    fn other_attributes_survive_serialization() {
        let instance = interpret_one(
            "<!-- wp:test/test-align-true {\"align\":\"left\",\"lock\":{\"move\":true}} -->\n\
             <div class=\"wp-block-test-test-align-true alignleft\">Test Align True</div>\n\
             <!-- /wp:test/test-align-true -->",
        );
        assert!(instance.is_valid());
        assert_eq!(
            instance.attributes().other.get("lock"),
            Some(&json!({"move": true}))
        );
        let out = instance.serialize(&registry());
        assert!(out.contains("\"lock\":{\"move\":true}"));
        assert!(out.contains("\"align\":\"left\""));
    }

    #[test]
    fn inserted_instance_serializes_from_type() {
        let registry = registry();
        let block = registry.get("test/test-default-align").unwrap();
        let instance = BlockInstance::inserted(ClientId(3), block);
        assert_eq!(
            instance.serialize(&registry),
            "<!-- wp:test/test-default-align -->\n\
             <div class=\"wp-block-test-test-default-align alignright\">Test Default Align</div>\n\
             <!-- /wp:test/test-default-align -->"
        );
        assert_eq!(
            instance.align_state(&registry),
            AlignState::Default(AlignToken::Right)
        );
    }
}
