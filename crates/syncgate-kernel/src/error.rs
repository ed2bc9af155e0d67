//! Error types for write validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which authorization gate rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Role,
    User,
    Access,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gate::Role => "role",
            Gate::User => "user",
            Gate::Access => "access",
        };
        f.write_str(name)
    }
}

/// A refusal returned by one of the host's authorization primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    reason: String,
}

impl Denial {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Reasons a proposed write is rejected.
///
/// Every variant aborts the write: nothing is granted or assigned once one
/// of these has been raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The document type is required but absent.
    #[error("type not given")]
    MissingType,

    /// An update tried to change the document type.
    #[error(
        "type has changed from {} to {}",
        display_type(.old.as_deref()),
        display_type(.new.as_deref())
    )]
    TypeChanged {
        old: Option<String>,
        new: Option<String>,
    },

    /// A field needed by a gate is absent from the subject document.
    #[error("{field} not given")]
    MissingField { field: String },

    /// A deletion arrived for a document with no stored revision.
    #[error("cannot delete a document that does not exist")]
    DeleteOfNonexistent,

    /// One of the host's authorization primitives refused the principal.
    #[error("forbidden by {gate} gate: {reason}")]
    Forbidden { gate: Gate, reason: String },
}

impl SyncError {
    /// Stable snake_case identifier for reports and fixtures.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::MissingType => "missing_type",
            SyncError::TypeChanged { .. } => "type_changed",
            SyncError::MissingField { .. } => "missing_field",
            SyncError::DeleteOfNonexistent => "delete_of_nonexistent",
            SyncError::Forbidden { .. } => "forbidden",
        }
    }

    pub(crate) fn forbidden(gate: Gate, denial: Denial) -> Self {
        SyncError::Forbidden {
            gate,
            reason: denial.reason,
        }
    }
}

fn display_type(doc_type: Option<&str>) -> String {
    match doc_type {
        Some(t) => format!("`{t}`"),
        None => "<none>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_rejection() {
        assert_eq!(SyncError::MissingType.to_string(), "type not given");
        assert_eq!(
            SyncError::MissingField {
                field: "owner_name".into()
            }
            .to_string(),
            "owner_name not given"
        );
        assert_eq!(
            SyncError::TypeChanged {
                old: None,
                new: Some("car".into()),
            }
            .to_string(),
            "type has changed from <none> to `car`"
        );
        assert_eq!(
            SyncError::forbidden(Gate::Access, Denial::new("missing channel `x`")).to_string(),
            "forbidden by access gate: missing channel `x`"
        );
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(SyncError::DeleteOfNonexistent.kind(), "delete_of_nonexistent");
        assert_eq!(
            SyncError::Forbidden {
                gate: Gate::Role,
                reason: String::new(),
            }
            .kind(),
            "forbidden"
        );
    }
}
