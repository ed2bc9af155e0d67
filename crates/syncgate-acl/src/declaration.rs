//! ACL declarations as authored next to each document type.
//!
//! ```toml
//! [types.car]
//! grants_access = true
//!
//! [[types.car.acl]]
//! action = "create"
//! role = "anyone"
//! owner = true
//!
//! [[types.car.acl]]
//! action = "update"
//! owner = true
//! role = "anyone"
//! fields = ["colour"]
//! ```
//!
//! A declaration's `role` defaults to no one: unless it is widened to
//! `"anyone"` or to a role list, the requirement needs an administrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use syncgate_kernel::{Operation, SequenceEquality};

/// Who may act, role-wise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleDecl {
    /// `"anyone"` or `"no_one"`.
    Keyword(RoleKeyword),
    /// Any one of these roles.
    Roles(Vec<String>),
    /// Nothing declared: no one (administrator only).
    #[default]
    #[serde(skip)]
    Unset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKeyword {
    Anyone,
    NoOne,
}

impl RoleDecl {
    pub fn is_unset(&self) -> bool {
        matches!(self, RoleDecl::Unset)
    }

    /// The registry form: `None` omits the role gate, `Some(vec![])` needs
    /// an administrator.
    pub fn to_roles(&self) -> Option<Vec<String>> {
        match self {
            RoleDecl::Keyword(RoleKeyword::Anyone) => None,
            RoleDecl::Keyword(RoleKeyword::NoOne) | RoleDecl::Unset => Some(Vec::new()),
            RoleDecl::Roles(roles) => Some(roles.clone()),
        }
    }
}

fn default_access() -> bool {
    true
}

/// One requirement declaration for one action on a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementDecl {
    pub action: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "RoleDecl::is_unset")]
    pub role: RoleDecl,
    /// `false` drops the channel-access gate.
    #[serde(default = "default_access")]
    pub access: bool,
    #[serde(default)]
    pub owner: bool,
    /// Update only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl RequirementDecl {
    pub fn new(action: Operation) -> Self {
        Self {
            action,
            user: None,
            role: RoleDecl::Unset,
            access: true,
            owner: false,
            fields: None,
        }
    }

    pub fn create() -> Self {
        Self::new(Operation::Create)
    }

    pub fn update() -> Self {
        Self::new(Operation::Update)
    }

    pub fn delete() -> Self {
        Self::new(Operation::Delete)
    }

    pub fn anyone(mut self) -> Self {
        self.role = RoleDecl::Keyword(RoleKeyword::Anyone);
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role = RoleDecl::Roles(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn owner(mut self) -> Self {
        self.owner = true;
        self
    }

    pub fn without_access(mut self) -> Self {
        self.access = false;
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Declarations for one document type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeAcl {
    /// Documents of this type grant their `access` list the channel named
    /// after the document id.
    #[serde(default)]
    pub grants_access: bool,
    /// `None` leaves the type unregistered (default-deny everywhere).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<RequirementDecl>>,
}

impl TypeAcl {
    /// A type with an (initially empty) ACL.
    pub fn declared() -> Self {
        Self {
            grants_access: false,
            acl: Some(Vec::new()),
        }
    }

    pub fn grants_access(mut self) -> Self {
        self.grants_access = true;
        self
    }

    pub fn with(mut self, decl: RequirementDecl) -> Self {
        self.acl.get_or_insert_with(Vec::new).push(decl);
        self
    }
}

/// A full set of type declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AclManifest {
    #[serde(default)]
    pub sequence_equality: SequenceEquality,
    #[serde(default)]
    pub types: BTreeMap<String, TypeAcl>,
}

impl AclManifest {
    pub fn with_type(mut self, name: impl Into<String>, acl: TypeAcl) -> Self {
        self.types.insert(name.into(), acl);
        self
    }
}
