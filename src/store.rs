//! File-backed configuration store.
//!
//! Persists the activation mode and condition strings of every entity in a
//! single binary file: a 32-byte fixed header followed by a bincode-encoded
//! payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"NWRL"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Writer version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! The format version must match exactly; the writer version is
//! informational only.
//!
//! Saves go to a sibling `<file>.tmp` which is then renamed over the store,
//! so a reader never sees a half-written file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    ActivationMode, Catalog, CommitError, Condition, ConditionSet, ConditionSetBuilder,
    ConditionalEntity, EntityKind,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"NWRL";
const FORMAT_VERSION: u16 = 1;
const WRITER_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors reading or writing a store file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not an nwam-rules store: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: file is v{file}, reader supports v{supported}")]
    IncompatibleVersion { file: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to encode store: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EntityRecord {
    kind: EntityKind,
    name: String,
    mode: ActivationMode,
    conditions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StorePayload {
    record_count: usize,
    records: Vec<EntityRecord>,
}

/// A stored entity with its conditions parsed. Condition strings are only
/// parsed on load and rendered on save.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    kind: EntityKind,
    name: String,
    set: ConditionSet,
}

impl Entry {
    fn to_record(&self) -> EntityRecord {
        EntityRecord {
            kind: self.kind,
            name: self.name.clone(),
            mode: self.set.mode(),
            conditions: self.set.to_strings(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Entities and their condition sets, persisted to one file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Vec<Entry>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O, format, integrity, or validation failure.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => decode(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), records = entries.len(), "store opened");
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of stored entities of `kind`, in insertion order.
    #[must_use]
    pub fn names(&self, kind: EntityKind) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.name.as_str())
            .collect()
    }

    #[must_use]
    pub fn contains(&self, kind: EntityKind, name: &str) -> bool {
        self.find(kind, name).is_some()
    }

    /// A handle for editing one entity. The entity is created on its first
    /// successful commit.
    pub fn entity(&mut self, kind: EntityKind, name: &str) -> StoredEntity<'_> {
        let (mode, conditions) = match self.find(kind, name) {
            Some(i) => (self.entries[i].set.mode(), self.entries[i].set.conditions().to_vec()),
            None => (ActivationMode::default(), Vec::new()),
        };
        StoredEntity {
            store: self,
            kind,
            name: name.to_owned(),
            mode,
            conditions,
        }
    }

    /// Delete an entity. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub fn remove(&mut self, kind: EntityKind, name: &str) -> Result<bool, StoreError> {
        let Some(i) = self.find(kind, name) else {
            return Ok(false);
        };
        let removed = self.entries.remove(i);
        if let Err(e) = self.save() {
            self.entries.insert(i, removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Write all records to disk, replacing the file in one rename.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on encoding or I/O failure. The file on disk is
    /// left as it was.
    pub fn save(&self) -> Result<(), StoreError> {
        let bytes = encode(&self.entries)?;
        let staging = self.staging_path();
        std::fs::write(&staging, bytes)?;
        if let Err(e) = std::fs::rename(&staging, &self.path) {
            if let Err(cleanup) = std::fs::remove_file(&staging) {
                warn!(path = %staging.display(), error = %cleanup, "staging file left behind");
            }
            return Err(e.into());
        }
        debug!(path = %self.path.display(), records = self.entries.len(), "store saved");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn find(&self, kind: EntityKind, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.kind == kind && e.name == name)
    }

    fn upsert(&mut self, entry: Entry) -> Option<Entry> {
        match self.find(entry.kind, &entry.name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i], entry)),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    fn restore(&mut self, kind: EntityKind, name: &str, previous: Option<Entry>) {
        let Some(i) = self.find(kind, name) else {
            return;
        };
        match previous {
            Some(prev) => self.entries[i] = prev,
            None => {
                self.entries.remove(i);
            }
        }
    }
}

impl Catalog for FileStore {
    fn interfaces(&self) -> Vec<String> {
        owned(self.names(EntityKind::Ncu))
    }

    fn locations(&self) -> Vec<String> {
        owned(self.names(EntityKind::Location))
    }

    fn services(&self) -> Vec<String> {
        owned(self.names(EntityKind::Enm))
    }

    fn known_wlans(&self) -> Vec<String> {
        Vec::new()
    }
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_owned).collect()
}

/// Staged edits to one stored entity. [`commit`](ConditionalEntity::commit)
/// validates the set and writes the whole store back to disk.
#[derive(Debug)]
pub struct StoredEntity<'s> {
    store: &'s mut FileStore,
    kind: EntityKind,
    name: String,
    mode: ActivationMode,
    conditions: Vec<Condition>,
}

impl ConditionalEntity for StoredEntity<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn conditions(&self) -> Vec<Condition> {
        self.conditions.clone()
    }

    fn set_conditions(&mut self, conditions: Vec<Condition>) {
        self.conditions = conditions;
    }

    fn activation_mode(&self) -> ActivationMode {
        self.mode
    }

    fn set_activation_mode(&mut self, mode: ActivationMode) {
        self.mode = mode;
    }

    fn commit(&mut self) -> Result<(), CommitError> {
        if self.name.trim().is_empty() {
            return Err(CommitError::for_property("name", "must not be empty"));
        }
        let set = ConditionSetBuilder::new()
            .mode(self.mode)
            .conditions(self.conditions.iter().cloned())
            .build()
            .map_err(|e| CommitError::for_property("conditions", e.to_string()))?;

        let previous = self.store.upsert(Entry {
            kind: self.kind,
            name: self.name.clone(),
            set,
        });
        if let Err(e) = self.store.save() {
            warn!(entity = %self.name, error = %e, "store write failed");
            self.store.restore(self.kind, &self.name, previous);
            return Err(CommitError::new(e.to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check the payload and parse every record's conditions.
fn validate(payload: StorePayload) -> Result<Vec<Entry>, StoreError> {
    if payload.record_count != payload.records.len() {
        return Err(StoreError::Validation(format!(
            "metadata says {} records but payload has {}",
            payload.record_count,
            payload.records.len()
        )));
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(payload.records.len());
    for record in payload.records {
        if !seen.insert((record.kind, record.name.clone())) {
            return Err(StoreError::Validation(format!(
                "duplicate {} '{}'",
                record.kind, record.name
            )));
        }
        let set = ConditionSet::from_strings(
            record.mode,
            record.conditions.iter().map(String::as_str),
        )
        .map_err(|e| StoreError::Validation(format!("{} '{}': {e}", record.kind, record.name)))?;
        entries.push(Entry {
            kind: record.kind,
            name: record.name,
            set,
        });
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&WRITER_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // a store never approaches 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), StoreError> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(StoreError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Encode/decode
// ---------------------------------------------------------------------------

fn encode(entries: &[Entry]) -> Result<Vec<u8>, StoreError> {
    let payload = StorePayload {
        record_count: entries.len(),
        records: entries.iter().map(Entry::to_record).collect(),
    };
    let payload = bincode::serde::encode_to_vec(&payload, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

fn decode(bytes: &[u8]) -> Result<Vec<Entry>, StoreError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(StoreError::IncompatibleVersion {
            file: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(StoreError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[HEADER_SIZE..payload_end];

    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(StoreError::ChecksumMismatch);
    }

    let (payload, _): (StorePayload, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    validate(payload)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
