//! Editable, row-per-condition state behind a rule editor.
//!
//! The editor always shows at least one row. A row's remove control is
//! disabled exactly when it is the only row; removing the last row replaces it
//! with a blank one. Field, operator, and value edits write through to the
//! row's [`Condition`] immediately; the set as a whole is only validated and
//! handed to the owning entity by [`RuleEditor::apply`].

mod page;
mod row;

use std::fmt;

use tracing::{debug, info, warn};

pub use page::{ConditionsPage, DialogOutcome, Page};
pub use row::{Row, RowId, ValueInput};

use crate::{
    ActivationMode, ApplyError, Catalog, Condition, ConditionField, ConditionOp, ConditionSet,
    ConditionSetBuilder, ConditionalEntity, EditorConfig, EntityKind, ValidationError,
};

/// Notifications for the widgets that own an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// The editor entered (`true`) or left (`false`) multi-row mode. The
    /// match-all/match-any selector is only shown in multi-row mode.
    MultiRow(bool),
    RowAdded(RowId),
    RowRemoved(RowId),
    /// A row's field, operator, or value changed.
    ConditionChanged(RowId),
    /// Every row was replaced from an entity. Handles seen before may be gone
    /// or now name different rows, so observers should re-read `row_ids`.
    Reloaded,
}

type Observer = Box<dyn FnMut(&EditorEvent)>;

/// Rule editor state: ordered rows over a recycling arena.
pub struct RuleEditor {
    catalog: Box<dyn Catalog>,
    config: EditorConfig,
    mode: ActivationMode,
    slots: Vec<Option<Row>>,
    rows: Vec<RowId>,
    /// Released rows whose records are kept for reuse.
    row_cache: Vec<RowId>,
    /// Released slots whose records were dropped because the cache was full.
    vacant: Vec<RowId>,
    bound: Option<(EntityKind, String)>,
    observers: Vec<Observer>,
}

impl fmt::Debug for RuleEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEditor")
            .field("mode", &self.mode)
            .field("rows", &self.rows)
            .field("row_cache", &self.row_cache)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

impl RuleEditor {
    /// Create an editor showing a single blank row.
    pub fn new(catalog: impl Catalog + 'static, config: EditorConfig) -> Self {
        let mut editor = Self {
            catalog: Box::new(catalog),
            config,
            mode: ActivationMode::Manual,
            slots: Vec::new(),
            rows: Vec::new(),
            row_cache: Vec::new(),
            vacant: Vec::new(),
            bound: None,
            observers: Vec::new(),
        };
        let id = editor.alloc();
        editor.rows.push(id);
        editor
    }

    /// Register a callback for [`EditorEvent`]s.
    pub fn subscribe(&mut self, observer: impl FnMut(&EditorEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn activation_mode(&self) -> ActivationMode {
        self.mode
    }

    pub fn set_activation_mode(&mut self, mode: ActivationMode) {
        debug!(%mode, "activation mode selected");
        self.mode = mode;
    }

    /// Row handles in display order. Never empty.
    #[must_use]
    pub fn row_ids(&self) -> &[RowId] {
        &self.rows
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &Row)> + '_ {
        self.rows.iter().filter_map(|&id| self.row(id).map(|r| (id, r)))
    }

    #[must_use]
    pub fn row(&self, id: RowId) -> Option<&Row> {
        if !self.rows.contains(&id) {
            return None;
        }
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn is_multi_row(&self) -> bool {
        self.rows.len() > 1
    }

    /// Number of released rows held for reuse.
    #[must_use]
    pub fn cached_rows(&self) -> usize {
        self.row_cache.len()
    }

    /// Conditions of every row in display order, blank rows included.
    #[must_use]
    pub fn conditions(&self) -> Vec<Condition> {
        self.rows().map(|(_, r)| r.condition.clone()).collect()
    }

    /// Insert a blank row directly after `after` and return its handle.
    ///
    /// An unknown `after` appends at the end.
    pub fn add_row_after(&mut self, after: RowId) -> RowId {
        let pos = self.position(after).map_or(self.rows.len(), |p| p + 1);
        let id = self.alloc();
        self.rows.insert(pos, id);
        debug!(row = %id, position = pos, rows = self.rows.len(), "row added");

        let entered_multi = self.rows.len() == 2;
        self.sync_remove_controls();
        self.emit(EditorEvent::RowAdded(id));
        if entered_multi {
            self.emit(EditorEvent::MultiRow(true));
        }
        id
    }

    /// Remove a row, returning its record to the cache. Removing the only row
    /// leaves a fresh blank row in its place.
    pub fn remove_row(&mut self, id: RowId) {
        let Some(pos) = self.position(id) else {
            debug_assert!(false, "remove_row: unknown {id}");
            return;
        };
        self.rows.remove(pos);
        self.release(id);
        debug!(row = %id, rows = self.rows.len(), "row removed");
        self.emit(EditorEvent::RowRemoved(id));

        if self.rows.is_empty() {
            let fresh = self.alloc();
            self.rows.push(fresh);
            self.sync_remove_controls();
            self.emit(EditorEvent::RowAdded(fresh));
        } else {
            self.sync_remove_controls();
            if self.rows.len() == 1 {
                self.emit(EditorEvent::MultiRow(false));
            }
        }
    }

    /// Select a field for a row.
    ///
    /// The operator list is narrowed to the field's compatible operators and
    /// the first becomes selected. The value input switches to the field's
    /// representation; the previous value is kept if it is still meaningful
    /// there (text to text, or a name present in the new picker), otherwise a
    /// picker selects its first entry and a text input is cleared.
    pub fn set_field(&mut self, id: RowId, field: ConditionField) {
        let bssid = self.config.bssid_policy;
        let Some(row) = self.row_mut(id) else {
            debug_assert!(false, "set_field: unknown {id}");
            return;
        };
        if row.condition.field == field {
            return;
        }
        let prior_kind = row.condition.field.value_kind();
        let kind = field.value_kind();

        row.operators = field.operators(bssid);
        row.condition.field = field;
        row.condition.op = field.default_op(bssid).unwrap_or_default();

        let mut input = ValueInput::build(kind, self.catalog.as_ref());
        let Some(row) = self.row_mut(id) else {
            return;
        };
        match &mut input {
            ValueInput::Reference {
                choices, selected, ..
            } => {
                let hit = choices.iter().position(|c| *c == row.condition.value);
                match (hit, choices.first()) {
                    (Some(i), _) => *selected = Some(i),
                    (None, Some(first)) => {
                        *selected = Some(0);
                        row.condition.value.clone_from(first);
                    }
                    (None, None) => {
                        *selected = None;
                        row.condition.value.clear();
                    }
                }
            }
            ValueInput::FreeText | ValueInput::Completion { .. } => {
                if !prior_kind.is_text() {
                    row.condition.value.clear();
                }
            }
            ValueInput::Disabled => row.condition.value.clear(),
        }
        row.input = input;
        debug!(row = %id, %field, op = %row.condition.op, "field changed");
        self.emit(EditorEvent::ConditionChanged(id));
    }

    /// Select an operator. Operators the row's field does not offer are ignored.
    pub fn set_op(&mut self, id: RowId, op: ConditionOp) {
        let Some(row) = self.row_mut(id) else {
            debug_assert!(false, "set_op: unknown {id}");
            return;
        };
        if !row.operators.contains(&op) {
            warn!(row = %id, field = %row.condition.field, %op, "operator not offered for field");
            return;
        }
        if row.condition.op == op {
            return;
        }
        row.condition.op = op;
        self.emit(EditorEvent::ConditionChanged(id));
    }

    /// Write a value through to the row's condition. A reference picker only
    /// takes one of its choices; anything else is ignored.
    pub fn set_value(&mut self, id: RowId, value: impl Into<String>) {
        let value = value.into();
        let Some(row) = self.row_mut(id) else {
            debug_assert!(false, "set_value: unknown {id}");
            return;
        };
        if row.condition.field == ConditionField::Last {
            debug!(row = %id, "value ignored: no field selected");
            return;
        }
        if !row.input.accepts(&value) {
            warn!(row = %id, field = %row.condition.field, %value, "value not offered by picker");
            return;
        }
        row.input.select(&value);
        row.condition.value = value;
        self.emit(EditorEvent::ConditionChanged(id));
    }

    /// Load `entity`'s activation mode and conditions, discarding unsaved
    /// edits. Without `force`, refreshing the entity already shown is a no-op.
    pub fn refresh(&mut self, entity: &dyn ConditionalEntity, force: bool) {
        let key = (entity.kind(), entity.name().to_owned());
        if !force && self.bound.as_ref() == Some(&key) {
            return;
        }

        let was_multi = self.is_multi_row();
        for id in std::mem::take(&mut self.rows) {
            self.release(id);
        }

        self.mode = entity.activation_mode();
        let bssid = self.config.bssid_policy;
        for condition in entity.conditions() {
            let id = self.alloc();
            if let Some(row) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
                row.bind(condition, self.catalog.as_ref(), bssid);
            }
            self.rows.push(id);
        }
        if self.rows.is_empty() {
            let id = self.alloc();
            self.rows.push(id);
        }
        self.sync_remove_controls();

        debug!(
            entity = %key.1,
            kind = %key.0,
            mode = %self.mode,
            rows = self.rows.len(),
            "editor refreshed"
        );
        self.bound = Some(key);
        self.emit(EditorEvent::Reloaded);
        if was_multi != self.is_multi_row() {
            self.emit(EditorEvent::MultiRow(self.is_multi_row()));
        }
    }

    /// The condition set the rows currently describe.
    ///
    /// Manual mode yields no conditions; otherwise rows left at their default
    /// (see [`Row::is_unset`]) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoRules`] for a conditional mode where every
    /// row is at its default.
    pub fn condition_set(&self) -> Result<ConditionSet, ValidationError> {
        let builder = ConditionSetBuilder::new().mode(self.mode);
        if self.mode == ActivationMode::Manual {
            return builder.build();
        }
        builder
            .conditions(
                self.rows()
                    .filter(|(_, r)| !r.is_unset())
                    .map(|(_, r)| r.condition.clone()),
            )
            .build()
    }

    /// Validate the rows and hand the resulting set to `entity`, then commit.
    ///
    /// On a validation error the entity is not touched. On any error the
    /// editor keeps its rows so the user can correct them.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Validation`] or [`ApplyError::Commit`].
    pub fn apply(&mut self, entity: &mut dyn ConditionalEntity) -> Result<(), ApplyError> {
        let set = self.condition_set().inspect_err(|e| {
            warn!(entity = entity.name(), error = %e, "apply rejected");
        })?;

        entity.set_conditions(set.conditions().to_vec());
        entity.set_activation_mode(set.mode());
        entity.commit()?;

        info!(
            entity = entity.name(),
            mode = %set.mode(),
            conditions = set.len(),
            "conditions applied"
        );
        Ok(())
    }

    fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|&r| r == id)
    }

    fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        if !self.rows.contains(&id) {
            return None;
        }
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Hand out a blank row, preferring a cached record.
    fn alloc(&mut self) -> RowId {
        if let Some(id) = self.row_cache.pop() {
            if let Some(row) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
                row.reset();
                return id;
            }
        }
        if let Some(id) = self.vacant.pop() {
            self.slots[id.0] = Some(Row::blank());
            return id;
        }
        self.slots.push(Some(Row::blank()));
        RowId(self.slots.len() - 1)
    }

    fn release(&mut self, id: RowId) {
        if self.row_cache.len() < self.config.row_cache_limit {
            self.row_cache.push(id);
        } else {
            self.slots[id.0] = None;
            self.vacant.push(id);
        }
    }

    fn sync_remove_controls(&mut self) {
        let enabled = self.rows.len() > 1;
        for &id in &self.rows {
            if let Some(row) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
                row.remove_enabled = enabled;
            }
        }
    }

    fn emit(&mut self, event: EditorEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}
