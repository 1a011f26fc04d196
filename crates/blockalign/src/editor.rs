#![forbid(unsafe_code)]

//! Editor session hosting block instances.
//!
//! This is the host side of the alignment engine: it owns the instances,
//! the selection and the document markup, and forwards toolbar clicks to
//! [`toolbar::toggle`]. Everything is synchronous; each call leaves the
//! session in a consistent state before returning.
//!
//! # Example
//!
//! ```
//! use blockalign::{Editor, PluginManifest};
//!
//! let registry = PluginManifest::align_hook_fixture().build_registry().unwrap();
//! let mut editor = Editor::new(registry);
//! editor.insert_block("Test Align True").unwrap();
//! assert!(editor.click("Align right").unwrap());
//! assert!(editor.edited_content().contains(r#""align":"right""#));
//! ```

use crate::block::{BlockInstance, ClientId};
use crate::markup::{MarkupError, parse_document};
use crate::registry::BlockRegistry;
use crate::toolbar::{self, ToggleError, ToolbarButton};
use crate::token::AlignToken;

/// Separator between serialized blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Failures of editor operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("no block type named or titled {query:?}")]
    UnknownBlockType { query: String },

    #[error("no block with client id {0}")]
    UnknownClientId(ClientId),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Toggle(#[from] ToggleError),
}

/// One editing session over a registry.
#[derive(Debug, Clone)]
pub struct Editor {
    registry: BlockRegistry,
    blocks: Vec<BlockInstance>,
    selected: Option<ClientId>,
    next_id: u64,
}

impl Editor {
    #[must_use]
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            registry,
            blocks: Vec::new(),
            selected: None,
            next_id: 1,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    fn allocate_id(&mut self) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Start an empty document. Client ids keep counting.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.selected = None;
    }

    /// Append a block by name or title and select it.
    ///
    /// # Errors
    ///
    /// [`EditorError::UnknownBlockType`] if nothing matches.
    pub fn insert_block(&mut self, name_or_title: &str) -> Result<ClientId, EditorError> {
        let Some(block) = self.registry.find(name_or_title).cloned() else {
            return Err(EditorError::UnknownBlockType {
                query: name_or_title.to_string(),
            });
        };
        let id = self.allocate_id();
        let instance = BlockInstance::inserted(id, &block);
        tracing::debug!(
            message = "editor.insert",
            client_id = %id,
            block = instance.name(),
        );
        self.blocks.push(instance);
        self.selected = Some(id);
        Ok(id)
    }

    /// Remove a block. Removing the selected block clears the selection.
    ///
    /// # Errors
    ///
    /// [`EditorError::UnknownClientId`].
    pub fn remove(&mut self, id: ClientId) -> Result<BlockInstance, EditorError> {
        let index = self.index_of(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.blocks.remove(index))
    }

    #[must_use]
    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    #[must_use]
    pub fn block(&self, id: ClientId) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| b.client_id() == id)
    }

    fn index_of(&self, id: ClientId) -> Result<usize, EditorError> {
        self.blocks
            .iter()
            .position(|b| b.client_id() == id)
            .ok_or(EditorError::UnknownClientId(id))
    }

    /// Select a block; its toolbar becomes the active one.
    ///
    /// # Errors
    ///
    /// [`EditorError::UnknownClientId`].
    pub fn select(&mut self, id: ClientId) -> Result<(), EditorError> {
        self.index_of(id)?;
        self.selected = Some(id);
        Ok(())
    }

    #[must_use]
    pub const fn selected(&self) -> Option<ClientId> {
        self.selected
    }

    /// Alignment controls of the selected block; empty without a selection
    /// or for block types without alignment.
    #[must_use]
    pub fn toolbar(&self) -> Vec<ToolbarButton> {
        let Some(instance) = self.selected.and_then(|id| self.block(id)) else {
            return Vec::new();
        };
        let Some(block) = self.registry.get(instance.name()) else {
            return Vec::new();
        };
        let settings = self.registry.settings();
        toolbar::project(
            &block.options(settings),
            block.effective(instance.align(), settings),
        )
    }

    /// Click the selected block's control labelled `label`.
    ///
    /// Returns `false` when no such control is shown.
    ///
    /// # Errors
    ///
    /// Only if the projected toolbar and the toggle disagree, which would be
    /// a bug.
    pub fn click(&mut self, label: &str) -> Result<bool, EditorError> {
        let Some(token) = AlignToken::from_label(label) else {
            return Ok(false);
        };
        if !self.toolbar().iter().any(|button| button.token == token) {
            return Ok(false);
        }
        let Some(id) = self.selected else {
            return Ok(false);
        };
        self.press(id, token)?;
        Ok(true)
    }

    /// Apply a press of `token` to block `id`.
    ///
    /// # Errors
    ///
    /// [`EditorError::UnknownClientId`], or [`EditorError::Toggle`] when the
    /// block type does not offer `token`.
    pub fn press(&mut self, id: ClientId, token: AlignToken) -> Result<(), EditorError> {
        let index = self.index_of(id)?;
        let settings = self.registry.settings();
        let instance = &mut self.blocks[index];
        let Some(block) = self.registry.get(instance.name()) else {
            return Err(ToggleError::AbsentCapability.into());
        };
        let from = instance.align();
        let to = toolbar::toggle(block.alignment_config(), from, token, settings)?;
        instance.set_align(to);
        tracing::debug!(
            message = "editor.toggle",
            client_id = %id,
            clicked = token.as_str(),
            from = %from,
            to = %to,
        );
        Ok(())
    }

    /// Serialized markup of the whole document.
    #[must_use]
    pub fn edited_content(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.serialize(&self.registry))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }

    /// Replace the document with parsed markup. New client ids are issued
    /// and the selection is cleared.
    ///
    /// # Errors
    ///
    /// [`EditorError::Markup`]; the document is left untouched then.
    pub fn set_content(&mut self, markup: &str) -> Result<(), EditorError> {
        let raw = parse_document(markup)?;
        let mut blocks = Vec::with_capacity(raw.len());
        for block in &raw {
            let id = self.allocate_id();
            blocks.push(BlockInstance::interpret(id, block, &self.registry));
        }
        let invalid = blocks.iter().filter(|b| !b.is_valid()).count();
        tracing::debug!(
            message = "editor.set_content",
            blocks = blocks.len(),
            invalid,
        );
        self.blocks = blocks;
        self.selected = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AlignAttribute;
    use crate::manifest::PluginManifest;
    use tracing_test::traced_test;

    fn editor() -> Editor {
        Editor::new(PluginManifest::align_hook_fixture().build_registry().unwrap())
    }

    #[test]
    fn empty_editor_has_no_toolbar() {
        let editor = editor();
        assert!(editor.toolbar().is_empty());
        assert_eq!(editor.edited_content(), "");
    }

    #[test]
    fn insert_selects_and_ids_are_unique() {
        let mut editor = editor();
        let a = editor.insert_block("Test Align True").unwrap();
        let b = editor.insert_block("test/test-align-array").unwrap();
        assert_ne!(a, b);
        assert_eq!(editor.selected(), Some(b));
        assert_eq!(editor.blocks().len(), 2);
    }

    #[test]
    fn unknown_block_type() {
        let mut editor = editor();
        assert_eq!(
            editor.insert_block("Nope"),
            Err(EditorError::UnknownBlockType {
                query: "Nope".into()
            })
        );
    }

    #[test]
    fn click_follows_selection() {
        let mut editor = editor();
        let a = editor.insert_block("Test Align True").unwrap();
        let b = editor.insert_block("Test Align True").unwrap();
        editor.select(a).unwrap();
        assert!(editor.click("Align left").unwrap());
        assert_eq!(
            editor.block(a).unwrap().align(),
            AlignAttribute::Value(AlignToken::Left)
        );
        assert_eq!(editor.block(b).unwrap().align(), AlignAttribute::Unset);
    }

    #[test]
    fn click_on_missing_control_is_a_no_op() {
        let mut editor = editor();
        editor.insert_block("Test Align Array").unwrap();
        assert!(!editor.click("Align right").unwrap());
        assert!(!editor.click("Bold").unwrap());
        editor.insert_block("Test No Alignment Set").unwrap();
        assert!(!editor.click("Align left").unwrap());
    }

    #[test]
    fn press_on_absent_capability_is_an_error() {
        let mut editor = editor();
        let id = editor.insert_block("Test No Alignment Set").unwrap();
        assert_eq!(
            editor.press(id, AlignToken::Left),
            Err(EditorError::Toggle(ToggleError::AbsentCapability))
        );
    }

    #[test]
    fn remove_clears_selection() {
        let mut editor = editor();
        let id = editor.insert_block("Test Align True").unwrap();
        let removed = editor.remove(id).unwrap();
        assert_eq!(removed.client_id(), id);
        assert_eq!(editor.selected(), None);
        assert_eq!(editor.remove(id), Err(EditorError::UnknownClientId(id)));
        assert_eq!(editor.select(id), Err(EditorError::UnknownClientId(id)));
    }

    #[test]
    fn set_content_reissues_ids() {
        let mut editor = editor();
        let first = editor.insert_block("Test Align True").unwrap();
        let markup = editor.edited_content();
        editor.set_content(&markup).unwrap();
        assert_eq!(editor.blocks().len(), 1);
        assert_ne!(editor.blocks()[0].client_id(), first);
        assert_eq!(editor.selected(), None);
        assert_eq!(editor.edited_content(), markup);
    }

    #[test]
    fn set_content_error_leaves_document() {
        let mut editor = editor();
        editor.insert_block("Test Align True").unwrap();
        let before = editor.edited_content();
        assert!(matches!(
            editor.set_content("<!-- wp:test/test-align-true -->"),
            Err(EditorError::Markup(_))
        ));
        assert_eq!(editor.edited_content(), before);
    }

    #[test]
    fn clear_keeps_counting_ids() {
        let mut editor = editor();
        let a = editor.insert_block("Test Align True").unwrap();
        editor.clear();
        assert!(editor.blocks().is_empty());
        let b = editor.insert_block("Test Align True").unwrap();
        assert!(b > a);
    }

    #[test]
    fn inserted_and_loaded_blocks_share_one_id_sequence() {
        let mut editor = editor();
        let a = editor.insert_block("Test Align True").unwrap();
        let markup = editor.edited_content();
        editor.set_content(&markup).unwrap();
        let loaded = editor.blocks()[0].client_id();
        let b = editor.insert_block("Test Align True").unwrap();
        assert!(a < loaded && loaded < b, "{a} {loaded} {b}");
        assert_eq!(b.raw(), loaded.raw() + 1);
    }

    #[test]
    #[traced_test]
    fn toggle_is_logged() {
        let mut editor = editor();
        editor.insert_block("Test Default Align").unwrap();
        assert!(editor.click("Align right").unwrap());
        assert!(logs_contain("editor.toggle"));
        assert!(logs_contain("to=null"));
    }
}
