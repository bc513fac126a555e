//! Canonical validation
//!
//! Per-entry-type field requirements are data, not code: a policy maps an
//! entry type to groups of alternative field names ("at least one of" per
//! group). The validator checks every record in a batch before anything is
//! raised, so strict mode reports all invalid entries at once, in original
//! batch order.

use std::collections::HashSet;
use std::fmt;

use crate::error::Error;

/// Required-field expression: every outer group must be satisfied, a group
/// is satisfied by any one of its alternatives.
pub type FieldGroups = &'static [&'static [&'static str]];

/// A required-field policy for one format dialect.
#[derive(Clone, Copy)]
pub struct Policy {
    pub name: &'static str,
    lookup: fn(&str) -> Option<FieldGroups>,
}

impl Policy {
    pub const fn new(name: &'static str, lookup: fn(&str) -> Option<FieldGroups>) -> Self {
        Self { name, lookup }
    }

    /// Required field groups for an entry type, or `None` if the type is
    /// unknown under this policy.
    pub fn required(&self, entry_type: &str) -> Option<FieldGroups> {
        (self.lookup)(entry_type)
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy").field("name", &self.name).finish()
    }
}

/// A record the validator can inspect, independent of its source format.
pub trait Validatable {
    fn key(&self) -> &str;
    fn type_name(&self) -> &str;
    fn has_field(&self, name: &str) -> bool;
}

/// One invalid entry in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub key: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Missing or unknown entry type; carries the literal offending type.
    InvalidType(String),
    /// Unmet field groups, each already rendered with `/` between
    /// alternatives, in declaration order.
    MissingFields(Vec<String>),
    /// Citation key already used earlier in the batch.
    DuplicateKey,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::InvalidType(type_name) => {
                write!(f, "{} has invalid type: \"{}\"", self.key, type_name)
            }
            ViolationKind::MissingFields(groups) => {
                write!(f, "{} has missing fields: {}", self.key, groups.join(", "))
            }
            ViolationKind::DuplicateKey => {
                write!(f, "{} has a duplicate citation key", self.key)
            }
        }
    }
}

/// Check a batch against a policy. All records are checked; the result
/// lists violations in batch order and is empty when everything passed.
pub fn validate<R: Validatable>(records: &[R], policy: &Policy) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen_keys: HashSet<&str> = HashSet::new();

    for record in records {
        if !seen_keys.insert(record.key()) {
            violations.push(Violation {
                key: record.key().to_string(),
                kind: ViolationKind::DuplicateKey,
            });
            continue;
        }

        let Some(groups) = policy.required(record.type_name()) else {
            violations.push(Violation {
                key: record.key().to_string(),
                kind: ViolationKind::InvalidType(record.type_name().to_string()),
            });
            continue;
        };

        let unmet: Vec<String> = groups
            .iter()
            .filter(|group| !group.iter().any(|field| record.has_field(field)))
            .map(|group| group.join("/"))
            .collect();
        if !unmet.is_empty() {
            violations.push(Violation {
                key: record.key().to_string(),
                kind: ViolationKind::MissingFields(unmet),
            });
        }
    }

    violations
}

/// Strict mode: raise the whole batch report as one error.
pub fn validate_strict<R: Validatable>(records: &[R], policy: &Policy) -> Result<(), Error> {
    let violations = validate(records, policy);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidEntries(violations))
    }
}
