use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of configuration object that owns a condition set or can be named
/// by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// A network configuration unit (interface).
    Ncu,
    /// A location profile.
    Location,
    /// An external network modifier (auxiliary service).
    Enm,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Ncu => write!(f, "ncu"),
            EntityKind::Location => write!(f, "loc"),
            EntityKind::Enm => write!(f, "enm"),
        }
    }
}
