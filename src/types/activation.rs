use std::fmt;

use serde::{Deserialize, Serialize};

/// Policy governing when a profile, location, or service turns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivationMode {
    /// Only on explicit user request. Conditions are ignored.
    #[default]
    Manual,
    /// Chosen by the system. Conditions are ignored.
    System,
    /// Active when every condition holds.
    ConditionalAll,
    /// Active when at least one condition holds.
    ConditionalAny,
}

impl ActivationMode {
    #[must_use]
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            ActivationMode::ConditionalAll | ActivationMode::ConditionalAny
        )
    }
}

impl fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationMode::Manual => write!(f, "manual"),
            ActivationMode::System => write!(f, "system"),
            ActivationMode::ConditionalAll => write!(f, "conditional-all"),
            ActivationMode::ConditionalAny => write!(f, "conditional-any"),
        }
    }
}
