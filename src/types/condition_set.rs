use std::fmt;

use serde::{Deserialize, Serialize};

use super::activation::ActivationMode;
use super::condition::Condition;
use super::error::ValidationError;
use super::evaluation_report::EvaluationReport;
use super::snapshot::NetworkSnapshot;

/// Builder for constructing a validated [`ConditionSet`].
///
/// # Example
///
/// ```
/// use nwam_rules::{condition, ActivationMode, ConditionField, ConditionSetBuilder};
///
/// let set = ConditionSetBuilder::new()
///     .mode(ActivationMode::ConditionalAll)
///     .condition(condition(ConditionField::Ncu).is("net0"))
///     .condition(condition(ConditionField::IpAddress).in_range("10.0.0.0/24"))
///     .build()
///     .unwrap();
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ConditionSetBuilder {
    mode: ActivationMode,
    conditions: Vec<Condition>,
}

impl ConditionSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(mut self, mode: ActivationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Append a condition. Order is kept for display.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    /// Validate and produce the set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoRules`] for a conditional mode without
    /// conditions and [`ValidationError::BlankCondition`] if any condition has
    /// no field selected.
    pub fn build(self) -> Result<ConditionSet, ValidationError> {
        if let Some(index) = self.conditions.iter().position(Condition::is_blank) {
            return Err(ValidationError::BlankCondition { index });
        }
        if self.mode.is_conditional() && self.conditions.is_empty() {
            return Err(ValidationError::NoRules);
        }
        Ok(ConditionSet {
            mode: self.mode,
            conditions: self.conditions,
        })
    }
}

/// The activation policy of one profile, location, or service together with
/// its ordered conditions.
///
/// A set is owned by exactly one entity and is replaced wholesale on apply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionSet {
    mode: ActivationMode,
    conditions: Vec<Condition>,
}

impl ConditionSet {
    /// Manual activation, no conditions.
    #[must_use]
    pub fn manual() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn system() -> Self {
        Self {
            mode: ActivationMode::System,
            conditions: Vec::new(),
        }
    }

    /// Parse persisted condition strings into a set with the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) if a string is malformed
    /// and [`Error::Validation`](crate::Error::Validation) if the result breaks
    /// a set invariant.
    pub fn from_strings<'a>(
        mode: ActivationMode,
        strings: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, crate::Error> {
        let conditions = strings
            .into_iter()
            .map(crate::parse::parse_condition)
            .collect::<Result<Vec<_>, _>>()?;
        let set = ConditionSetBuilder::new()
            .mode(mode)
            .conditions(conditions)
            .build()?;
        Ok(set)
    }

    /// Render the conditions as persisted condition strings.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        self.conditions.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn mode(&self) -> ActivationMode {
        self.mode
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether the owner should be active given the observed network state.
    ///
    /// `Manual` never activates, `System` always does; the conditional modes
    /// combine the per-condition results with ALL or ANY.
    #[must_use]
    pub fn evaluate(&self, snapshot: &NetworkSnapshot) -> bool {
        crate::evaluate::evaluate(self.mode, &self.conditions, snapshot)
    }

    /// Evaluate with per-condition diagnostics.
    pub fn evaluate_detailed(&self, snapshot: &NetworkSnapshot) -> EvaluationReport {
        crate::evaluate::evaluate_detailed(self.mode, &self.conditions, snapshot)
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConditionSet({}, {} conditions)",
            self.mode,
            self.conditions.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{condition, ConditionField};

    #[test]
    fn builder_keeps_insertion_order() {
        let set = ConditionSetBuilder::new()
            .mode(ActivationMode::ConditionalAny)
            .condition(condition(ConditionField::Essid).contains("home"))
            .condition(condition(ConditionField::Ncu).is("net0"))
            .build()
            .unwrap();
        assert_eq!(set.mode(), ActivationMode::ConditionalAny);
        assert_eq!(set.conditions()[0].field, ConditionField::Essid);
        assert_eq!(set.conditions()[1].field, ConditionField::Ncu);
    }

    #[test]
    fn conditional_without_conditions_is_rejected() {
        let result = ConditionSetBuilder::new()
            .mode(ActivationMode::ConditionalAll)
            .build();
        assert_eq!(result, Err(ValidationError::NoRules));
    }

    #[test]
    fn blank_condition_is_rejected() {
        let result = ConditionSetBuilder::new()
            .mode(ActivationMode::ConditionalAll)
            .condition(condition(ConditionField::Ncu).is("net0"))
            .condition(Condition::default())
            .build();
        assert_eq!(result, Err(ValidationError::BlankCondition { index: 1 }));
    }

    #[test]
    fn manual_without_conditions_is_fine() {
        let set = ConditionSetBuilder::new().build().unwrap();
        assert_eq!(set, ConditionSet::manual());
        assert!(set.is_empty());
    }

    #[test]
    fn system_constructor() {
        assert_eq!(ConditionSet::system().mode(), ActivationMode::System);
    }

    #[test]
    fn strings_round_trip() {
        let strings = [
            "ncu is net0",
            "ip-address is-not-in-range 192.168.0.0/16",
            r#"essid contains "Coffee Shop""#,
        ];
        let set =
            ConditionSet::from_strings(ActivationMode::ConditionalAny, strings).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.to_strings(), strings);
    }

    #[test]
    fn from_strings_reports_parse_errors() {
        let result = ConditionSet::from_strings(ActivationMode::ConditionalAll, ["ncu frobs net0"]);
        assert!(matches!(result, Err(crate::Error::Parse(_))));
    }

    #[test]
    fn from_strings_reports_validation_errors() {
        let result = ConditionSet::from_strings(ActivationMode::ConditionalAll, []);
        assert!(matches!(
            result,
            Err(crate::Error::Validation(ValidationError::NoRules))
        ));
    }

    #[test]
    fn display() {
        let set = ConditionSetBuilder::new()
            .mode(ActivationMode::ConditionalAll)
            .condition(condition(ConditionField::Ncu).is("net0"))
            .build()
            .unwrap();
        assert_eq!(set.to_string(), "ConditionSet(conditional-all, 1 conditions)");
    }
}
