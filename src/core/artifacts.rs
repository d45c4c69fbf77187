//! The artifacts ledger.
//!
//! The ledger remembers, per target key (`"<triple>/<profile>"` or just
//! `"<profile>"` for native builds), the [`BuildSettings`] the target was last
//! built with, plus which target's binary currently sits in the addon slot.
//!
//! A ledger that cannot be read is treated as empty: an unreadable ledger is
//! equivalent to "nothing has ever been built", which at worst costs a
//! rebuild.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::core::errors::{ValidationError, ValidationErrorKind};
use crate::core::settings::BuildSettings;
use crate::core::target::is_target_key;
use crate::util::fs::write_string;

/// Persisted record of built targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    active: Option<String>,
    targets: BTreeMap<String, BuildSettings>,
}

/// Why a ledger file was read as empty.
#[derive(Debug)]
pub enum EmptyReason {
    Missing,
    Unreadable(io::Error),
    Malformed(serde_json::Error),
    Invalid(ValidationError),
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::Missing => write!(f, "file does not exist"),
            EmptyReason::Unreadable(e) => write!(f, "unreadable: {}", e),
            EmptyReason::Malformed(e) => write!(f, "malformed JSON: {}", e),
            EmptyReason::Invalid(e) => write!(f, "invalid ledger: {}", e),
        }
    }
}

/// Result of reading a ledger file.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Artifacts),
    Empty(EmptyReason),
}

impl Artifacts {
    pub fn new() -> Self {
        Artifacts::default()
    }

    /// Read a ledger file, reporting why it was unusable if it was.
    pub fn load(path: &Path) -> LoadOutcome {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return LoadOutcome::Empty(EmptyReason::Missing)
            }
            Err(e) => return LoadOutcome::Empty(EmptyReason::Unreadable(e)),
        };

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => return LoadOutcome::Empty(EmptyReason::Malformed(e)),
        };

        match Self::from_json(&value) {
            Ok(ledger) => LoadOutcome::Loaded(ledger),
            Err(e) => LoadOutcome::Empty(EmptyReason::Invalid(e)),
        }
    }

    /// Read a ledger file, falling back to an empty ledger.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            LoadOutcome::Loaded(ledger) => ledger,
            LoadOutcome::Empty(EmptyReason::Missing) => Artifacts::new(),
            LoadOutcome::Empty(reason) => {
                tracing::debug!(
                    "ignoring ledger {} ({}), starting from an empty one",
                    path.display(),
                    reason
                );
                Artifacts::new()
            }
        }
    }

    /// Write the full ledger.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.to_json())
            .context("failed to serialize artifacts ledger")?;
        write_string(path, &text)
    }

    /// Validate and deserialize a ledger document.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValidationError::new("", ValidationErrorKind::ExpectedObject))?;

        let active = match obj.get("active") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) => None,
            Some(_) => {
                return Err(ValidationError::new(
                    "active",
                    ValidationErrorKind::ExpectedStringOrNull,
                ))
            }
            None => return Err(ValidationError::new("active", ValidationErrorKind::Missing)),
        };

        let records = match obj.get("targets") {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ValidationError::new(
                    "targets",
                    ValidationErrorKind::ExpectedObject,
                ))
            }
            None => return Err(ValidationError::new("targets", ValidationErrorKind::Missing)),
        };

        let mut targets = BTreeMap::new();
        for (key, record) in records {
            if !is_target_key(key) {
                return Err(
                    ValidationError::new(key.as_str(), ValidationErrorKind::InvalidTargetKey)
                        .within("targets"),
                );
            }
            let settings = BuildSettings::from_json(record)
                .map_err(|e| e.within(key).within("targets"))?;
            targets.insert(key.clone(), settings);
        }

        if let Some(key) = &active {
            if !targets.contains_key(key) {
                return Err(ValidationError::new(
                    "active",
                    ValidationErrorKind::UnknownTarget,
                ));
            }
        }

        Ok(Artifacts { active, targets })
    }

    pub fn to_json(&self) -> Value {
        let targets: Map<String, Value> = self
            .targets
            .iter()
            .map(|(key, settings)| (key.clone(), settings.to_json()))
            .collect();

        serde_json::json!({
            "active": self.active,
            "targets": targets,
        })
    }

    /// Key of the target whose binary occupies the addon slot.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn lookup(&self, key: &str) -> Option<&BuildSettings> {
        self.targets.get(key)
    }

    pub fn targets(&self) -> &BTreeMap<String, BuildSettings> {
        &self.targets
    }

    /// Record `settings` for `key` and make it the active target.
    ///
    /// Records of other keys are kept, so switching between profiles or
    /// cross targets never discards their fingerprints.
    pub fn activate(&mut self, key: &str, settings: BuildSettings) {
        self.targets.insert(key.to_string(), settings);
        self.active = Some(key.to_string());
    }

    pub fn have_activated(&self, key: &str) -> bool {
        self.active.as_deref() == Some(key)
    }

    /// Forget `key`; if it was active, nothing is active anymore.
    pub fn delete(&mut self, key: &str) {
        self.targets.remove(key);
        if self.have_activated(key) {
            self.active = None;
        }
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.active = None;
        self.targets.clear();
    }
}
