//! Requirement registry: (operation, document type) -> requirement(s).
//!
//! Create and delete register at most one requirement per type; update
//! registers an ordered list. An unregistered pair is not an error: it
//! means default-deny, which the evaluator enforces.

use crate::requirement::{Operation, Requirement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The create or delete requirement for the type.
    Single(&'a Requirement),
    /// The update requirements for the type, in registration order.
    Ordered(&'a [Requirement]),
    /// Nothing registered; only administrative privilege may write.
    Absent,
}

impl<'a> Lookup<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    /// The create or delete requirement, if one is registered.
    pub fn single(self) -> Option<&'a Requirement> {
        match self {
            Lookup::Single(requirement) => Some(requirement),
            Lookup::Ordered(_) | Lookup::Absent => None,
        }
    }

    /// The update requirements, if any are registered.
    pub fn ordered(self) -> Option<&'a [Requirement]> {
        match self {
            Lookup::Ordered(requirements) => Some(requirements),
            Lookup::Single(_) | Lookup::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementRegistry {
    #[serde(default)]
    pub(crate) create: BTreeMap<String, Requirement>,
    #[serde(default)]
    pub(crate) update: BTreeMap<String, Vec<Requirement>>,
    #[serde(default)]
    pub(crate) delete: BTreeMap<String, Requirement>,
}

impl RequirementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, operation: Operation, doc_type: &str) -> Lookup<'_> {
        match operation {
            Operation::Create => self.create(doc_type).map_or(Lookup::Absent, Lookup::Single),
            Operation::Update => self
                .update(doc_type)
                .map_or(Lookup::Absent, Lookup::Ordered),
            Operation::Delete => self.delete(doc_type).map_or(Lookup::Absent, Lookup::Single),
        }
    }

    pub fn create(&self, doc_type: &str) -> Option<&Requirement> {
        self.create.get(doc_type)
    }

    /// Update requirements for `doc_type`. An empty registered list reads
    /// as nothing registered.
    pub fn update(&self, doc_type: &str) -> Option<&[Requirement]> {
        self.update
            .get(doc_type)
            .map(Vec::as_slice)
            .filter(|requirements| !requirements.is_empty())
    }

    pub fn delete(&self, doc_type: &str) -> Option<&Requirement> {
        self.delete.get(doc_type)
    }

    /// Register the create requirement, returning the one it replaced.
    pub fn set_create(
        &mut self,
        doc_type: impl Into<String>,
        requirement: Requirement,
    ) -> Option<Requirement> {
        self.create.insert(doc_type.into(), requirement)
    }

    /// Append an update requirement after those already registered.
    pub fn push_update(&mut self, doc_type: impl Into<String>, requirement: Requirement) {
        self.update
            .entry(doc_type.into())
            .or_default()
            .push(requirement);
    }

    /// Register the delete requirement, returning the one it replaced.
    pub fn set_delete(
        &mut self,
        doc_type: impl Into<String>,
        requirement: Requirement,
    ) -> Option<Requirement> {
        self.delete.insert(doc_type.into(), requirement)
    }

    /// Every document type with at least one registered requirement.
    pub fn document_types(&self) -> BTreeSet<&str> {
        self.create
            .keys()
            .chain(self.update.keys())
            .chain(self.delete.keys())
            .map(String::as_str)
            .collect()
    }

    /// Number of requirements registered for `operation` across all types.
    pub fn requirement_count(&self, operation: Operation) -> usize {
        match operation {
            Operation::Create => self.create.len(),
            Operation::Update => self.update.values().map(Vec::len).sum(),
            Operation::Delete => self.delete.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    /// Single-requirement entries (create and delete) that carry a
    /// `fields` list, which only has meaning on update.
    pub(crate) fn misplaced_fields(&self) -> impl Iterator<Item = (Operation, &str)> + '_ {
        let create = self
            .create
            .iter()
            .map(|(doc_type, requirement)| (Operation::Create, doc_type, requirement));
        let delete = self
            .delete
            .iter()
            .map(|(doc_type, requirement)| (Operation::Delete, doc_type, requirement));
        create
            .chain(delete)
            .filter(|(_, _, requirement)| requirement.fields.is_some())
            .map(|(operation, doc_type, _)| (operation, doc_type.as_str()))
    }
}
