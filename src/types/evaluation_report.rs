use std::fmt;
use std::time::Duration;

use super::activation::ActivationMode;

/// Detailed evaluation report returned by
/// [`ConditionSet::evaluate_detailed()`](super::condition_set::ConditionSet::evaluate_detailed).
///
/// Contains the activation result, which conditions held, which could not be
/// evaluated at all, and the wall-clock duration of the evaluation.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    mode: ActivationMode,
    active: bool,
    held: Vec<usize>,
    undecidable: Vec<usize>,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(
        mode: ActivationMode,
        active: bool,
        held: Vec<usize>,
        undecidable: Vec<usize>,
        duration: Duration,
    ) -> Self {
        Self {
            mode,
            active,
            held,
            undecidable,
            duration,
        }
    }

    /// The activation mode the set was evaluated under.
    #[must_use]
    pub fn mode(&self) -> ActivationMode {
        self.mode
    }

    /// Same as [`ConditionSet::evaluate()`](super::condition_set::ConditionSet::evaluate).
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Indices of conditions that held, in set order.
    #[must_use]
    pub fn held(&self) -> &[usize] {
        &self.held
    }

    /// Indices of conditions that are blank, use an incompatible operator, or
    /// carry a value that does not parse (e.g. a malformed CIDR).
    #[must_use]
    pub fn undecidable(&self) -> &[usize] {
        &self.undecidable
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: active = {}", self.mode, self.active)?;
        let held: Vec<String> = self.held.iter().map(ToString::to_string).collect();
        write!(f, ", held: [{}]", held.join(", "))?;
        if !self.undecidable.is_empty() {
            let bad: Vec<String> = self.undecidable.iter().map(ToString::to_string).collect();
            write!(f, ", undecidable: [{}]", bad.join(", "))?;
        }
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
