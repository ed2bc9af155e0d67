//! Requirement evaluation: the ordered authorization gates.
//!
//! Gates run in a fixed order and the first failure is returned:
//!
//! 1. no requirement: administrative privilege (empty role set), nothing else
//! 2. `owner`: the subject must name an owner, and the principal must be it
//! 3. unless `withoutAccess`: access to every channel of the subject
//! 4. `user`: the principal must be that user
//! 5. `role`: the principal must hold one of the roles

use crate::document::{Document, OWNER_FIELD};
use crate::error::{Gate, SyncError};
use crate::host::SyncHost;
use crate::requirement::Requirement;
use tracing::trace;

/// Check one requirement against `subject`.
pub fn check<H>(
    host: &H,
    subject: &Document,
    requirement: Option<&Requirement>,
) -> Result<(), SyncError>
where
    H: SyncHost + ?Sized,
{
    let Some(requirement) = requirement else {
        trace!(doc_id = %subject.id, "no requirement registered; requiring admin");
        return require_admin(host);
    };

    if requirement.owner {
        let owner = subject
            .owner_name
            .as_deref()
            .ok_or_else(|| SyncError::MissingField {
                field: OWNER_FIELD.to_string(),
            })?;
        host.require_user(owner)
            .map_err(|denial| SyncError::forbidden(Gate::User, denial))?;
    }

    if !requirement.without_access {
        host.require_access(subject.channels())
            .map_err(|denial| SyncError::forbidden(Gate::Access, denial))?;
    }

    if let Some(user) = requirement.user.as_deref() {
        host.require_user(user)
            .map_err(|denial| SyncError::forbidden(Gate::User, denial))?;
    }

    if let Some(roles) = requirement.role.as_deref() {
        host.require_role(roles)
            .map_err(|denial| SyncError::forbidden(Gate::Role, denial))?;
    }

    Ok(())
}

/// The default-deny gate: only administrative privilege passes.
pub fn require_admin<H>(host: &H) -> Result<(), SyncError>
where
    H: SyncHost + ?Sized,
{
    host.require_role(&[])
        .map_err(|denial| SyncError::forbidden(Gate::Role, denial))
}
