#![forbid(unsafe_code)]

//! Block alignment capability resolution and serialization.
//!
//! # Role
//! `blockalign` decides, for every block type in a block editor, which
//! alignment controls exist, which one is pressed, and how the chosen
//! alignment is written to and recovered from the block comment-delimiter
//! markup the editor saves.
//!
//! # This crate provides
//! - [`AlignmentConfig`] and [`OptionSet`] for declared capability and the
//!   resolved option list.
//! - [`AlignAttribute`] and [`AlignState`] for the stored value and its
//!   lifecycle.
//! - [`codec`] for the markup mapping, and [`markup`] for the delimiter
//!   grammar itself.
//! - [`toolbar`] for control projection and click transitions.
//! - [`BlockRegistry`], [`BlockInstance`] and [`Editor`] for hosting blocks.
//! - [`validate()`] for the parse-after-save check.
//! - [`PluginManifest`] for declaring block types in TOML or JSON.
//!
//! # How it fits together
//! Block types are registered once (usually from a manifest). The editor
//! creates instances, asks [`toolbar::project`] what to render, applies
//! clicks through [`toolbar::toggle`], and serializes through [`codec`].
//! Loading markup runs the same codec backwards and re-saves every block to
//! check it is valid.

/// Stored alignment attribute, effective alignment and lifecycle state.
pub mod attribute;
/// Block instances and their interpretation from markup.
pub mod block;
/// Mapping between stored alignment and saved markup.
pub mod codec;
/// Declared alignment capability and editor settings.
pub mod config;
/// Editor session.
pub mod editor;
/// Root element and class list handling.
pub mod html;
/// Plugin manifests.
pub mod manifest;
/// Block comment-delimiter grammar.
pub mod markup;
/// Resolved alignment options.
pub mod options;
/// Registered block types.
pub mod registry;
/// Alignment tokens.
pub mod token;
/// Toolbar projection and toggling.
pub mod toolbar;
/// Parse-after-save validation.
pub mod validate;

pub use attribute::{AlignAttribute, AlignState, effective, effective_with};
pub use block::{BlockAttributes, BlockInstance, ClientId, FREEFORM_BLOCK, InvalidReason};
pub use codec::{AlignField, CodecError, SerializedAlign};
pub use config::{
    AlignDeclaration, AlignSupport, AlignmentConfig, ConfigurationError, EditorSettings,
};
pub use editor::{Editor, EditorError};
pub use html::{ClassList, RootElement};
pub use manifest::{BlockDeclaration, ManifestError, PluginManifest};
pub use markup::{Attrs, MarkupError, RawBlock, parse_document, serialize_block};
pub use options::OptionSet;
pub use registry::{BlockRegistry, BlockType};
pub use token::{AlignToken, UnknownToken};
pub use toolbar::{ToggleError, ToolbarButton};
pub use validate::{ParseInconsistency, ValidatedBlock, validate};
