use tracing::debug;

use super::RuleEditor;
use crate::{ApplyError, Catalog, ConditionalEntity, EditorConfig};

/// The operations a dialog page responds to. Pages implement what they need;
/// `cancel` and `help` default to doing nothing.
pub trait Page {
    /// Reload the page from its backing object. Without `force`, a page that
    /// already shows that object may keep its state.
    fn refresh(&mut self, force: bool);

    /// Write the page's state back to its backing object.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError`] if validation or the commit fails; the page keeps
    /// its state for correction.
    fn apply(&mut self) -> Result<(), ApplyError>;

    fn cancel(&mut self) {}

    /// Help topic for this page, if it has one.
    fn help(&self) -> Option<&str> {
        None
    }
}

/// What a dialog does after its Apply/OK button ran every page's `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Close,
    /// Keep the dialog open and show the error.
    StayOpen(ApplyError),
}

impl DialogOutcome {
    /// Apply each page in order, stopping at the first failure.
    pub fn apply_all<'a>(pages: impl IntoIterator<Item = &'a mut dyn Page>) -> Self {
        for page in pages {
            if let Err(e) = page.apply() {
                return DialogOutcome::StayOpen(e);
            }
        }
        DialogOutcome::Close
    }
}

/// The conditions page of a profile, location, or service dialog.
#[derive(Debug)]
pub struct ConditionsPage<E> {
    entity: E,
    editor: RuleEditor,
}

impl<E: ConditionalEntity> ConditionsPage<E> {
    /// Create the page and load `entity` into it.
    pub fn new(entity: E, catalog: impl Catalog + 'static, config: EditorConfig) -> Self {
        let mut editor = RuleEditor::new(catalog, config);
        editor.refresh(&entity, true);
        Self { entity, editor }
    }

    #[must_use]
    pub fn entity(&self) -> &E {
        &self.entity
    }

    #[must_use]
    pub fn editor(&self) -> &RuleEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RuleEditor {
        &mut self.editor
    }

    /// Give back the entity, e.g. after the dialog closed.
    pub fn into_entity(self) -> E {
        self.entity
    }
}

impl<E: ConditionalEntity> Page for ConditionsPage<E> {
    fn refresh(&mut self, force: bool) {
        self.editor.refresh(&self.entity, force);
    }

    fn apply(&mut self) -> Result<(), ApplyError> {
        self.editor.apply(&mut self.entity)
    }

    fn cancel(&mut self) {
        debug!(entity = self.entity.name(), "conditions edit cancelled");
        self.editor.refresh(&self.entity, true);
    }

    fn help(&self) -> Option<&str> {
        Some("nwam-conditions")
    }
}
