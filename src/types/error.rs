use thiserror::Error;

/// A condition set that breaks a domain rule before it reaches the
/// configuration service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Conditional mode selected but no rules configured")]
    NoRules,

    #[error("condition {index} has no field selected")]
    BlankCondition { index: usize },
}

/// The configuration service rejected a commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe_commit(.property, .message))]
pub struct CommitError {
    pub property: Option<String>,
    pub message: String,
}

impl CommitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            property: None,
            message: message.into(),
        }
    }

    pub fn for_property(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: Some(property.into()),
            message: message.into(),
        }
    }
}

fn describe_commit(property: &Option<String>, message: &str) -> String {
    match property {
        Some(p) => format!("invalid value for property '{p}': {message}"),
        None => format!("commit failed: {message}"),
    }
}

/// Failure of an editor or page `apply`. The editor keeps its rows either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}
