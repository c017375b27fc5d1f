//! Activation conditions for NWAM network profiles, locations, and services,
//! and the state machine behind the rule editor that edits them.

mod config;
mod editor;
mod entity;
mod error;
mod evaluate;
pub mod parse;
#[cfg(feature = "file-store")]
pub mod store;
mod types;

pub use config::{ConfigError, EditorConfig};
pub use editor::{
    ConditionsPage, DialogOutcome, EditorEvent, Page, Row, RowId, RuleEditor, ValueInput,
};
pub use entity::{Catalog, ConditionalEntity, MemoryEntity, StaticCatalog};
pub use error::Error;
pub use parse::{parse_condition, ParseError};
pub use types::{
    condition, ActivationMode, ApplyError, BssidPolicy, CommitError, Condition, ConditionBuilder,
    ConditionField, ConditionOp, ConditionSet, ConditionSetBuilder, EntityKind, EvaluationReport,
    NetworkSnapshot, ValidationError, ValueKind,
};
