#![forbid(unsafe_code)]

//! Markup round-trip check.
//!
//! [`validate`] parses a document that is expected to hold exactly one
//! block and reports the attributes recovered from it. Anything else (no
//! block, several blocks, a block that fails validation) is a
//! [`ParseInconsistency`]; nothing is repaired.

use crate::attribute::AlignState;
use crate::block::{BlockAttributes, BlockInstance, ClientId, InvalidReason};
use crate::markup::{MarkupError, parse_document};
use crate::registry::BlockRegistry;

/// The single block recovered from markup.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBlock {
    pub name: String,
    pub attributes: BlockAttributes,
    pub state: AlignState,
}

/// Markup that does not round-trip to exactly one valid block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseInconsistency {
    #[error("markup does not parse: {0}")]
    Markup(#[from] MarkupError),

    #[error("expected exactly one block, found {count}")]
    BlockCount { count: usize },

    #[error("block `{name}` is invalid: {reason}")]
    Invalid { name: String, reason: InvalidReason },
}

/// Parse `markup` and check it holds one valid block.
///
/// # Errors
///
/// See [`ParseInconsistency`].
pub fn validate(registry: &BlockRegistry, markup: &str) -> Result<ValidatedBlock, ParseInconsistency> {
    let raw = parse_document(markup)?;
    if raw.len() != 1 {
        tracing::debug!(message = "validate.block_count", count = raw.len());
        return Err(ParseInconsistency::BlockCount { count: raw.len() });
    }

    let instance = BlockInstance::interpret(ClientId(0), &raw[0], registry);
    if let Some(reason) = instance.invalid_reason() {
        tracing::debug!(
            message = "validate.invalid",
            block = instance.name(),
            reason = %reason,
        );
        return Err(ParseInconsistency::Invalid {
            name: instance.name().to_string(),
            reason: reason.clone(),
        });
    }

    Ok(ValidatedBlock {
        name: instance.name().to_string(),
        state: instance.align_state(registry),
        attributes: instance.attributes().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AlignAttribute;
    use crate::config::AlignmentConfig;
    use crate::registry::BlockType;
    use crate::token::AlignToken;

    fn registry() -> BlockRegistry {
        let mut registry = BlockRegistry::default();
        registry
            .register(
                BlockType::new("test/test-align-array", "Test Align Array")
                    .alignment(AlignmentConfig::only([AlignToken::Left, AlignToken::Center])),
            )
            .unwrap();
        registry
    }

    const CENTER: &str = "<!-- wp:test/test-align-array {\"align\":\"center\"} -->\n\
        <div class=\"wp-block-test-test-align-array aligncenter\">Test Align Array</div>\n\
        <!-- /wp:test/test-align-array -->";

    #[test]
    fn single_valid_block() {
        let validated = validate(&registry(), CENTER).unwrap();
        assert_eq!(validated.name, "test/test-align-array");
        assert_eq!(
            validated.attributes.align,
            AlignAttribute::Value(AlignToken::Center)
        );
        assert_eq!(validated.state, AlignState::Explicit(AlignToken::Center));
    }

    #[test]
    fn empty_document_is_inconsistent() {
        assert_eq!(
            validate(&registry(), "  \n"),
            Err(ParseInconsistency::BlockCount { count: 0 })
        );
    }

    #[test]
    fn two_blocks_are_inconsistent() {
        let doc = format!("{CENTER}\n\n{CENTER}");
        assert_eq!(
            validate(&registry(), &doc),
            Err(ParseInconsistency::BlockCount { count: 2 })
        );
    }

    #[test]
    fn invalid_block_is_reported() {
        let doc = CENTER.replace(" aligncenter", "");
        assert!(matches!(
            validate(&registry(), &doc),
            Err(ParseInconsistency::Invalid { .. })
        ));
    }

    #[test]
    fn markup_errors_are_reported() {
        assert!(matches!(
            validate(&registry(), "<!-- wp:test/test-align-array -->"),
            Err(ParseInconsistency::Markup(MarkupError::Unclosed { .. }))
        ));
    }
}
