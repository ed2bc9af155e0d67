//! Compile ACL declarations into a sync policy.
//!
//! Rules:
//! - a type without an ACL registers nothing and stays default-deny;
//! - a declared type gets an administrator-only requirement for any action
//!   it does not mention;
//! - at most one create and one delete declaration per type;
//! - `fields` only on update declarations;
//! - types flagged `grants_access` become access types.

use crate::declaration::{AclManifest, RequirementDecl, TypeAcl};
use std::fs;
use std::path::Path;
use syncgate_kernel::{Operation, Requirement, RequirementRegistry, SyncPolicy};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid ACL manifest: {0}")]
    Parse(String),

    #[error("too many {action} requirements in `{doc_type}` ({count} declared, at most 1)")]
    TooMany {
        doc_type: String,
        action: Operation,
        count: usize,
    },

    #[error("`fields` is only allowed on update requirements (`{doc_type}` {action})")]
    FieldsOutsideUpdate { doc_type: String, action: Operation },
}

impl From<&RequirementDecl> for Requirement {
    fn from(decl: &RequirementDecl) -> Self {
        Requirement {
            owner: decl.owner,
            without_access: !decl.access,
            user: decl.user.clone(),
            role: decl.role.to_roles(),
            fields: decl.fields.clone(),
        }
    }
}

/// Parse a TOML manifest and compile it.
pub fn compile_toml_str(source: &str) -> Result<SyncPolicy, AclError> {
    let manifest: AclManifest =
        toml::from_str(source).map_err(|e| AclError::Parse(e.to_string()))?;
    compile(&manifest)
}

/// Read a TOML manifest from disk and compile it.
pub fn compile_path(path: impl AsRef<Path>) -> Result<SyncPolicy, AclError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| AclError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    compile_toml_str(&source)
}

pub fn compile(manifest: &AclManifest) -> Result<SyncPolicy, AclError> {
    let mut registry = RequirementRegistry::new();
    let mut access_types = Vec::new();

    for (doc_type, type_acl) in &manifest.types {
        if type_acl.grants_access {
            access_types.push(doc_type.clone());
        }
        register_type(&mut registry, doc_type, type_acl)?;
    }

    Ok(SyncPolicy::new(registry)
        .with_access_types(access_types)
        .with_sequence_equality(manifest.sequence_equality))
}

fn register_type(
    registry: &mut RequirementRegistry,
    doc_type: &str,
    type_acl: &TypeAcl,
) -> Result<(), AclError> {
    let Some(acl) = type_acl.acl.as_deref() else {
        debug!(doc_type, "no acl declared; leaving default-deny");
        return Ok(());
    };

    let create = single(doc_type, acl, Operation::Create)?;
    registry.set_create(doc_type, create.map_or_else(admin_only, Requirement::from));

    let updates: Vec<&RequirementDecl> = of_action(acl, Operation::Update).collect();
    if updates.is_empty() {
        registry.push_update(doc_type, admin_only());
    }
    for decl in updates {
        registry.push_update(doc_type, Requirement::from(decl));
    }

    let delete = single(doc_type, acl, Operation::Delete)?;
    registry.set_delete(doc_type, delete.map_or_else(admin_only, Requirement::from));

    debug!(doc_type, declarations = acl.len(), "registered acl");
    Ok(())
}

fn of_action(
    acl: &[RequirementDecl],
    action: Operation,
) -> impl Iterator<Item = &RequirementDecl> + '_ {
    acl.iter().filter(move |decl| decl.action == action)
}

fn single<'a>(
    doc_type: &str,
    acl: &'a [RequirementDecl],
    action: Operation,
) -> Result<Option<&'a RequirementDecl>, AclError> {
    let decls: Vec<&RequirementDecl> = of_action(acl, action).collect();
    if decls.len() > 1 {
        return Err(AclError::TooMany {
            doc_type: doc_type.to_string(),
            action,
            count: decls.len(),
        });
    }
    if let Some(decl) = decls.first()
        && decl.fields.is_some()
    {
        return Err(AclError::FieldsOutsideUpdate {
            doc_type: doc_type.to_string(),
            action,
        });
    }
    Ok(decls.first().copied())
}

fn admin_only() -> Requirement {
    Requirement {
        role: Some(Vec::new()),
        ..Requirement::default()
    }
}
