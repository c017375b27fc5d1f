use thiserror::Error;

use crate::config::ConfigError;
use crate::parse::ParseError;
use crate::{ApplyError, CommitError, ValidationError};

/// Unified error type covering parsing, validation, commits, and configuration.
///
/// Returned by convenience methods like
/// [`ConditionSet::from_strings()`](crate::ConditionSet::from_strings).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[cfg(feature = "file-store")]
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

impl From<ApplyError> for Error {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::Validation(e) => Error::Validation(e),
            ApplyError::Commit(e) => Error::Commit(e),
        }
    }
}
