//! Seams to the system configuration service.
//!
//! The service itself lives outside this crate. A profile, location, or
//! service that owns a condition set is reached through [`ConditionalEntity`];
//! the lists shown by reference pickers come from a [`Catalog`].

use tracing::{info, warn};

use crate::{ActivationMode, CommitError, Condition, EntityKind};

/// An object owned by the configuration service that carries an activation
/// mode and a condition set.
///
/// Setters stage changes; nothing is persisted until [`commit`](Self::commit).
pub trait ConditionalEntity {
    fn name(&self) -> &str;

    fn kind(&self) -> EntityKind;

    fn conditions(&self) -> Vec<Condition>;

    /// Replace the condition set wholesale.
    fn set_conditions(&mut self, conditions: Vec<Condition>);

    fn activation_mode(&self) -> ActivationMode;

    fn set_activation_mode(&mut self, mode: ActivationMode);

    /// Persist staged changes.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError`], naming the offending property when known, if
    /// the service rejects the write.
    fn commit(&mut self) -> Result<(), CommitError>;
}

/// Read-only snapshot queries backing the reference pickers.
pub trait Catalog {
    /// Names of configured network interfaces.
    fn interfaces(&self) -> Vec<String>;

    /// Names of configured locations.
    fn locations(&self) -> Vec<String>;

    /// Names of configured auxiliary services.
    fn services(&self) -> Vec<String>;

    /// ESSIDs of known and favorite wireless networks.
    fn known_wlans(&self) -> Vec<String>;

    /// The picker contents for entities of the given kind.
    fn references(&self, kind: EntityKind) -> Vec<String> {
        match kind {
            EntityKind::Ncu => self.interfaces(),
            EntityKind::Location => self.locations(),
            EntityKind::Enm => self.services(),
        }
    }
}

/// A [`Catalog`] over owned lists.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub interfaces: Vec<String>,
    pub locations: Vec<String>,
    pub services: Vec<String>,
    pub known_wlans: Vec<String>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_owned());
        self
    }

    #[must_use]
    pub fn location(mut self, name: &str) -> Self {
        self.locations.push(name.to_owned());
        self
    }

    #[must_use]
    pub fn service(mut self, name: &str) -> Self {
        self.services.push(name.to_owned());
        self
    }

    #[must_use]
    pub fn known_wlan(mut self, essid: &str) -> Self {
        self.known_wlans.push(essid.to_owned());
        self
    }
}

impl Catalog for StaticCatalog {
    fn interfaces(&self) -> Vec<String> {
        self.interfaces.clone()
    }

    fn locations(&self) -> Vec<String> {
        self.locations.clone()
    }

    fn services(&self) -> Vec<String> {
        self.services.clone()
    }

    fn known_wlans(&self) -> Vec<String> {
        self.known_wlans.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct EntityState {
    mode: ActivationMode,
    conditions: Vec<Condition>,
}

/// In-memory [`ConditionalEntity`] with separate staged and committed state.
///
/// A rejection can be armed with [`reject_next_commit`](Self::reject_next_commit)
/// to stand in for the service refusing a write. Calls to `set_conditions`
/// are counted so callers can verify that a rejected apply never staged
/// anything.
#[derive(Debug, Clone)]
pub struct MemoryEntity {
    name: String,
    kind: EntityKind,
    staged: EntityState,
    committed: EntityState,
    pending_rejection: Option<CommitError>,
    set_conditions_calls: usize,
    commits: usize,
}

impl MemoryEntity {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            staged: EntityState::default(),
            committed: EntityState::default(),
            pending_rejection: None,
            set_conditions_calls: 0,
            commits: 0,
        }
    }

    /// Seed both staged and committed state, as if loaded from the service.
    #[must_use]
    pub fn with_conditions(mut self, mode: ActivationMode, conditions: Vec<Condition>) -> Self {
        let state = EntityState { mode, conditions };
        self.staged = state.clone();
        self.committed = state;
        self
    }

    /// Make the next `commit` fail with `error`. Staged state is discarded.
    pub fn reject_next_commit(&mut self, error: CommitError) {
        self.pending_rejection = Some(error);
    }

    #[must_use]
    pub fn committed_conditions(&self) -> &[Condition] {
        &self.committed.conditions
    }

    #[must_use]
    pub fn committed_mode(&self) -> ActivationMode {
        self.committed.mode
    }

    #[must_use]
    pub fn set_conditions_calls(&self) -> usize {
        self.set_conditions_calls
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl ConditionalEntity for MemoryEntity {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn conditions(&self) -> Vec<Condition> {
        self.staged.conditions.clone()
    }

    fn set_conditions(&mut self, conditions: Vec<Condition>) {
        self.set_conditions_calls += 1;
        self.staged.conditions = conditions;
    }

    fn activation_mode(&self) -> ActivationMode {
        self.staged.mode
    }

    fn set_activation_mode(&mut self, mode: ActivationMode) {
        self.staged.mode = mode;
    }

    fn commit(&mut self) -> Result<(), CommitError> {
        if let Some(err) = self.pending_rejection.take() {
            warn!(entity = %self.name, kind = %self.kind, error = %err, "commit rejected");
            // The service is transactional: a rejected write leaves the
            // committed state untouched.
            self.staged = self.committed.clone();
            return Err(err);
        }
        self.committed = self.staged.clone();
        self.commits += 1;
        info!(
            entity = %self.name,
            kind = %self.kind,
            mode = %self.committed.mode,
            conditions = self.committed.conditions.len(),
            "committed"
        );
        Ok(())
    }
}
