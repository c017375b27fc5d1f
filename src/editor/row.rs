use std::fmt;

use crate::{BssidPolicy, Catalog, Condition, ConditionField, ConditionOp, EntityKind, ValueKind};

/// Handle to a row in a [`RuleEditor`](super::RuleEditor).
///
/// A handle released by `remove_row` or `refresh` may be handed out again for
/// a later row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub(crate) usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row#{}", self.0)
    }
}

/// The value-entry representation a row currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueInput {
    Disabled,
    FreeText,
    /// Free text with completion suggestions.
    Completion { suggestions: Vec<String> },
    /// A picker over configured entities. `selected` indexes `choices`.
    Reference {
        kind: EntityKind,
        choices: Vec<String>,
        selected: Option<usize>,
    },
}

impl ValueInput {
    pub(crate) fn build(kind: ValueKind, catalog: &dyn Catalog) -> Self {
        match kind {
            ValueKind::Disabled => ValueInput::Disabled,
            ValueKind::FreeText => ValueInput::FreeText,
            ValueKind::Completion => ValueInput::Completion {
                suggestions: catalog.known_wlans(),
            },
            ValueKind::Reference(kind) => ValueInput::Reference {
                kind,
                choices: catalog.references(kind),
                selected: None,
            },
        }
    }

    /// Point a reference picker at `value`, if it is one of the choices.
    pub(crate) fn select(&mut self, value: &str) {
        if let ValueInput::Reference {
            choices, selected, ..
        } = self
        {
            *selected = choices.iter().position(|c| c == value);
        }
    }

    /// Whether `value` can be entered here. Pickers only take their choices.
    pub(crate) fn accepts(&self, value: &str) -> bool {
        match self {
            ValueInput::Reference { choices, .. } => choices.iter().any(|c| c == value),
            ValueInput::Disabled | ValueInput::FreeText | ValueInput::Completion { .. } => true,
        }
    }
}

/// One editable condition row.
#[derive(Debug, Clone)]
pub struct Row {
    pub(crate) condition: Condition,
    pub(crate) operators: &'static [ConditionOp],
    pub(crate) input: ValueInput,
    pub(crate) remove_enabled: bool,
}

impl Row {
    pub(crate) fn blank() -> Self {
        Self {
            condition: Condition::default(),
            operators: &[],
            input: ValueInput::Disabled,
            remove_enabled: false,
        }
    }

    /// Return a recycled row to the blank state, keeping its allocations.
    pub(crate) fn reset(&mut self) {
        self.condition.field = ConditionField::Last;
        self.condition.op = ConditionOp::default();
        self.condition.value.clear();
        self.operators = &[];
        self.input = ValueInput::Disabled;
        self.remove_enabled = false;
    }

    /// Show an existing condition exactly as stored.
    pub(crate) fn bind(&mut self, condition: Condition, catalog: &dyn Catalog, bssid: BssidPolicy) {
        self.operators = condition.field.operators(bssid);
        self.input = ValueInput::build(condition.field.value_kind(), catalog);
        self.input.select(&condition.value);
        self.condition = condition;
    }

    /// A row left at its default contributes nothing to a condition set: no
    /// field is selected, or its picker has nothing selected.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.condition.is_blank()
            || (matches!(self.input, ValueInput::Reference { .. })
                && self.condition.value.is_empty())
    }

    /// The condition this row writes through to.
    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Operators the operator picker offers.
    #[must_use]
    pub fn operators(&self) -> &[ConditionOp] {
        self.operators
    }

    #[must_use]
    pub fn input(&self) -> &ValueInput {
        &self.input
    }

    #[must_use]
    pub fn remove_enabled(&self) -> bool {
        self.remove_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{condition, StaticCatalog};

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .interface("net0")
            .interface("net1")
            .known_wlan("home")
    }

    #[test]
    fn blank_row_is_disabled() {
        let row = Row::blank();
        assert!(row.condition().is_blank());
        assert!(row.operators().is_empty());
        assert_eq!(row.input(), &ValueInput::Disabled);
        assert!(!row.remove_enabled());
    }

    #[test]
    fn bind_selects_matching_reference() {
        let mut row = Row::blank();
        row.bind(
            condition(ConditionField::Ncu).is_not("net1"),
            &catalog(),
            BssidPolicy::default(),
        );
        assert_eq!(row.operators(), &[ConditionOp::Is, ConditionOp::IsNot]);
        assert_eq!(
            row.input(),
            &ValueInput::Reference {
                kind: EntityKind::Ncu,
                choices: vec!["net0".into(), "net1".into()],
                selected: Some(1),
            }
        );
    }

    #[test]
    fn bind_keeps_unknown_reference_value() {
        let mut row = Row::blank();
        row.bind(
            condition(ConditionField::Ncu).is("gone0"),
            &catalog(),
            BssidPolicy::default(),
        );
        assert_eq!(row.condition().value, "gone0");
        assert!(matches!(row.input(), ValueInput::Reference { selected: None, .. }));
    }

    #[test]
    fn empty_picker_row_is_unset() {
        let mut row = Row::blank();
        assert!(row.is_unset());
        row.bind(
            condition(ConditionField::Enm).is(""),
            &StaticCatalog::new(),
            BssidPolicy::default(),
        );
        assert!(row.is_unset());

        row.bind(
            condition(ConditionField::Essid).contains(""),
            &catalog(),
            BssidPolicy::default(),
        );
        assert!(!row.is_unset());
    }

    #[test]
    fn picker_accepts_only_choices() {
        let picker = ValueInput::build(ValueKind::Reference(EntityKind::Ncu), &catalog());
        assert!(picker.accepts("net1"));
        assert!(!picker.accepts("net9"));
        assert!(ValueInput::FreeText.accepts("anything"));
    }

    #[test]
    fn bind_essid_offers_suggestions() {
        let mut row = Row::blank();
        row.bind(
            condition(ConditionField::Essid).contains("ho"),
            &catalog(),
            BssidPolicy::default(),
        );
        assert_eq!(
            row.input(),
            &ValueInput::Completion {
                suggestions: vec!["home".into()]
            }
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut row = Row::blank();
        row.bind(
            condition(ConditionField::IpAddress).in_range("10.0.0.0/8"),
            &catalog(),
            BssidPolicy::default(),
        );
        row.remove_enabled = true;
        row.reset();
        assert!(row.condition().is_blank());
        assert_eq!(row.condition().value, "");
        assert_eq!(row.input(), &ValueInput::Disabled);
        assert!(!row.remove_enabled());
    }
}
