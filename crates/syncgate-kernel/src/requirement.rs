//! Requirements: the declarative rules gating one operation on one type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of mutation a write performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Create, Operation::Update, Operation::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(format!(
                "unknown operation `{other}`; expected create, update, or delete"
            )),
        }
    }
}

/// A single authorization rule.
///
/// The default value requires only channel access to the subject's
/// channels. `role: Some(vec![])` is the strictest role requirement: it can
/// only be met with administrative privilege.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Requirement {
    /// The acting principal must be the document's `owner_name`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub owner: bool,

    /// Skip the channel-access gate.
    #[serde(rename = "withoutAccess", default, skip_serializing_if = "is_false")]
    pub without_access: bool,

    /// The acting principal must be exactly this user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// The acting principal must hold at least one of these roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Vec<String>>,

    /// Update only: evaluate this requirement only when one of these
    /// fields changes. `None` means every update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Requirement {
    /// Requirement satisfied by any of `roles` (plus channel access).
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: Some(roles.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Requirement satisfied only by the document owner (plus channel access).
    pub fn owned() -> Self {
        Self {
            owner: true,
            ..Self::default()
        }
    }

    /// Restrict this requirement to updates touching one of `fields`.
    pub fn on_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Drop the channel-access gate.
    pub fn without_access(mut self) -> Self {
        self.without_access = true;
        self
    }
}
