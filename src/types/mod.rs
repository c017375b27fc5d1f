mod activation;
mod compat;
mod condition;
mod condition_set;
mod entity_kind;
mod error;
mod evaluation_report;
mod snapshot;

pub use activation::ActivationMode;
pub use compat::{BssidPolicy, ValueKind};
pub use condition::{condition, Condition, ConditionBuilder, ConditionField, ConditionOp};
pub use condition_set::{ConditionSet, ConditionSetBuilder};
pub use entity_kind::EntityKind;
pub use error::{ApplyError, CommitError, ValidationError};
pub use evaluation_report::EvaluationReport;
pub use snapshot::NetworkSnapshot;
