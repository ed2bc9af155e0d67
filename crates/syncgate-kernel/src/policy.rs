//! Sync policy: the static configuration a sync function is built from.
//!
//! A policy bundles the requirement registry, the set of document types
//! whose access lists emit grants, and the sequence comparison mode used by
//! change detection. It is loaded once at startup and never mutated, so a
//! single instance can serve concurrent writes.
//!
//! ## File shape
//!
//! ```toml
//! access_types = ["car"]
//! sequence_equality = "joined"
//!
//! [create.post]
//! role = ["author"]
//!
//! [[update.profile]]
//! owner = true
//! fields = ["email"]
//!
//! [delete.post]
//! owner = true
//! ```
//!
//! The same shape is accepted as JSON.

use crate::change::SequenceEquality;
use crate::registry::RequirementRegistry;
use crate::requirement::{Operation, Requirement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Errors raised while loading a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid TOML policy: {0}")]
    Toml(String),

    #[error("invalid JSON policy: {0}")]
    Json(String),

    #[error("`fields` is only meaningful on update requirements ({operation} `{doc_type}`)")]
    FieldsOutsideUpdate {
        operation: Operation,
        doc_type: String,
    },
}

/// Immutable configuration for one sync function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PolicyDocument", into = "PolicyDocument")]
pub struct SyncPolicy {
    registry: RequirementRegistry,
    access_types: BTreeSet<String>,
    sequence_equality: SequenceEquality,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyDocument {
    #[serde(default)]
    access_types: BTreeSet<String>,
    #[serde(default)]
    sequence_equality: SequenceEquality,
    #[serde(default)]
    create: BTreeMap<String, Requirement>,
    #[serde(default)]
    update: BTreeMap<String, Vec<Requirement>>,
    #[serde(default)]
    delete: BTreeMap<String, Requirement>,
}

impl From<PolicyDocument> for SyncPolicy {
    fn from(doc: PolicyDocument) -> Self {
        Self {
            registry: RequirementRegistry {
                create: doc.create,
                update: doc.update,
                delete: doc.delete,
            },
            access_types: doc.access_types,
            sequence_equality: doc.sequence_equality,
        }
    }
}

impl From<SyncPolicy> for PolicyDocument {
    fn from(policy: SyncPolicy) -> Self {
        let RequirementRegistry {
            create,
            update,
            delete,
        } = policy.registry;
        Self {
            access_types: policy.access_types,
            sequence_equality: policy.sequence_equality,
            create,
            update,
            delete,
        }
    }
}

impl SyncPolicy {
    pub fn new(registry: RequirementRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Emit access grants for documents of these types.
    pub fn with_access_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.access_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sequence_equality(mut self, sequence_equality: SequenceEquality) -> Self {
        self.sequence_equality = sequence_equality;
        self
    }

    /// Parse and validate a TOML policy.
    pub fn from_toml_str(source: &str) -> Result<Self, PolicyError> {
        let policy: SyncPolicy =
            toml::from_str(source).map_err(|e| PolicyError::Toml(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Parse and validate a JSON policy.
    pub fn from_json_str(source: &str) -> Result<Self, PolicyError> {
        let policy: SyncPolicy =
            serde_json::from_str(source).map_err(|e| PolicyError::Json(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy file; `.json` files parse as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_toml_str(&source)
        }
    }

    /// Reject registries that put `fields` on create or delete requirements.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if let Some((operation, doc_type)) = self.registry.misplaced_fields().next() {
            return Err(PolicyError::FieldsOutsideUpdate {
                operation,
                doc_type: doc_type.to_string(),
            });
        }
        Ok(())
    }

    pub fn registry(&self) -> &RequirementRegistry {
        &self.registry
    }

    pub fn access_types(&self) -> &BTreeSet<String> {
        &self.access_types
    }

    pub fn grants_access(&self, doc_type: &str) -> bool {
        self.access_types.contains(doc_type)
    }

    pub fn sequence_equality(&self) -> SequenceEquality {
        self.sequence_equality
    }

    /// Render as the JSON lookup table shape.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
