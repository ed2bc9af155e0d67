//! Write classification and requirement dispatch.
//!
//! Each write takes exactly one branch, chosen once at entry:
//!
//! ```text
//! new._deleted ──yes──▶ Delete   (old revision required; checked against old)
//!      │no
//! old exists? ──no───▶ Create   (checked against new)
//!      │yes
//!      ▼
//!    Update   (type must not change; triggered requirements checked
//!              against old, in registration order)
//! ```
//!
//! Nothing is granted or assigned here; see [`crate::grants`] for what
//! happens after a write has been authorized.

use crate::change::first_changed;
use crate::document::Document;
use crate::error::SyncError;
use crate::evaluator::{check, require_admin};
use crate::grants::Emission;
use crate::host::SyncHost;
use crate::policy::SyncPolicy;
use crate::requirement::Operation;
use serde::Serialize;
use tracing::{debug, trace, warn};

/// What happened to one requirement slot during authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RequirementCheck {
    /// Nothing registered for the operation and type; admin gate applied.
    DefaultDeny,
    /// The requirement at `index` was evaluated and passed.
    Passed {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        triggered_by: Option<String>,
    },
    /// The update requirement at `index` was not triggered by this change.
    Skipped { index: usize },
}

/// A write that passed authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub operation: Operation,
    pub doc_id: String,
    pub doc_type: String,
    pub checks: Vec<RequirementCheck>,
}

/// An accepted write: its authorization and the grants it emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    #[serde(flatten)]
    pub authorization: Authorization,
    pub emission: Emission,
}

impl SyncPolicy {
    /// Run the sync function for one proposed write.
    ///
    /// Authorizes the write and, only if that succeeds, emits its grants and
    /// channel assignment. An error means the write must be rejected; the
    /// host has then seen no side effects.
    pub fn sync<H>(
        &self,
        host: &mut H,
        new: &Document,
        old: Option<&Document>,
    ) -> Result<SyncOutcome, SyncError>
    where
        H: SyncHost + ?Sized,
    {
        let authorization = self.authorize(&*host, new, old).inspect_err(|err| {
            warn!(doc_id = %new.id, kind = err.kind(), "write rejected: {err}");
        })?;
        let emission = self.emit_grants(host, new);
        Ok(SyncOutcome {
            authorization,
            emission,
        })
    }

    /// Decide whether the acting principal may perform this write.
    pub fn authorize<H>(
        &self,
        host: &H,
        new: &Document,
        old: Option<&Document>,
    ) -> Result<Authorization, SyncError>
    where
        H: SyncHost + ?Sized,
    {
        if new.deleted {
            return self.authorize_delete(host, old);
        }
        match old {
            None => self.authorize_create(host, new),
            Some(old) => self.authorize_update(host, new, old),
        }
    }

    fn authorize_delete<H>(
        &self,
        host: &H,
        old: Option<&Document>,
    ) -> Result<Authorization, SyncError>
    where
        H: SyncHost + ?Sized,
    {
        let old = old.ok_or(SyncError::DeleteOfNonexistent)?;
        let doc_type = old.doc_type().ok_or(SyncError::MissingType)?;
        debug!(doc_id = %old.id, doc_type, "authorizing delete");

        let requirement = self.registry().lookup(Operation::Delete, doc_type).single();
        check(host, old, requirement)?;
        Ok(single(Operation::Delete, old, doc_type, requirement.is_some()))
    }

    fn authorize_create<H>(&self, host: &H, new: &Document) -> Result<Authorization, SyncError>
    where
        H: SyncHost + ?Sized,
    {
        let doc_type = new.doc_type().ok_or(SyncError::MissingType)?;
        debug!(doc_id = %new.id, doc_type, "authorizing create");

        let requirement = self.registry().lookup(Operation::Create, doc_type).single();
        check(host, new, requirement)?;
        Ok(single(Operation::Create, new, doc_type, requirement.is_some()))
    }

    fn authorize_update<H>(
        &self,
        host: &H,
        new: &Document,
        old: &Document,
    ) -> Result<Authorization, SyncError>
    where
        H: SyncHost + ?Sized,
    {
        let doc_type = new.doc_type().ok_or(SyncError::MissingType)?;
        if old.doc_type() != Some(doc_type) {
            return Err(SyncError::TypeChanged {
                old: old.doc_type().map(String::from),
                new: Some(doc_type.to_string()),
            });
        }
        debug!(doc_id = %old.id, doc_type, "authorizing update");

        let lookup = self.registry().lookup(Operation::Update, doc_type);
        let Some(requirements) = lookup.ordered() else {
            require_admin(host)?;
            return Ok(Authorization {
                operation: Operation::Update,
                doc_id: old.id.clone(),
                doc_type: doc_type.to_string(),
                checks: vec![RequirementCheck::DefaultDeny],
            });
        };

        let mut checks = Vec::with_capacity(requirements.len());
        for (index, requirement) in requirements.iter().enumerate() {
            let triggered_by = match requirement.fields.as_deref() {
                None => None,
                Some(fields) => {
                    match first_changed(old, new, fields, self.sequence_equality()) {
                        Some(field) => Some(field.to_string()),
                        None => {
                            trace!(doc_id = %old.id, index, "update requirement not triggered");
                            checks.push(RequirementCheck::Skipped { index });
                            continue;
                        }
                    }
                }
            };
            debug!(doc_id = %old.id, index, ?triggered_by, "checking update requirement");
            check(host, old, Some(requirement))?;
            checks.push(RequirementCheck::Passed {
                index,
                triggered_by,
            });
        }

        Ok(Authorization {
            operation: Operation::Update,
            doc_id: old.id.clone(),
            doc_type: doc_type.to_string(),
            checks,
        })
    }
}

fn single(
    operation: Operation,
    subject: &Document,
    doc_type: &str,
    registered: bool,
) -> Authorization {
    let check = if registered {
        RequirementCheck::Passed {
            index: 0,
            triggered_by: None,
        }
    } else {
        RequirementCheck::DefaultDeny
    };
    Authorization {
        operation,
        doc_id: subject.id.clone(),
        doc_type: doc_type.to_string(),
        checks: vec![check],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::SequenceEquality;
    use crate::error::Gate;
    use crate::memory::{MemoryHost, Principal};
    use crate::registry::RequirementRegistry;
    use crate::requirement::Requirement;
    use serde_json::json;

    fn policy() -> SyncPolicy {
        let mut registry = RequirementRegistry::new();
        registry.set_create("post", Requirement::with_roles(["author"]).without_access());
        registry.set_delete("post", Requirement::owned().without_access());
        registry.push_update(
            "profile",
            Requirement::owned().without_access().on_fields(["email"]),
        );
        registry.push_update(
            "profile",
            Requirement::with_roles(["moderator"])
                .without_access()
                .on_fields(["badges", "email"]),
        );
        registry.push_update("note", Requirement::owned().without_access());
        SyncPolicy::new(registry)
    }

    fn host(name: &str) -> MemoryHost {
        MemoryHost::new(Principal::named(name))
    }

    fn profile(email: &str) -> Document {
        Document::new("p1")
            .with_type("profile")
            .with_owner("alice")
            .with_field("email", json!(email))
            .with_field("name", json!("Alice"))
    }

    #[test]
    fn create_uses_create_requirement_against_new() {
        let post = Document::new("post1").with_type("post");
        let author = MemoryHost::new(Principal::named("ann").with_roles(["author"]));
        let authorization = policy().authorize(&author, &post, None).unwrap();
        assert_eq!(authorization.operation, Operation::Create);
        assert_eq!(
            authorization.checks,
            vec![RequirementCheck::Passed {
                index: 0,
                triggered_by: None
            }]
        );

        let err = policy().authorize(&host("bob"), &post, None).unwrap_err();
        assert!(matches!(err, SyncError::Forbidden { gate: Gate::Role, .. }));
    }

    #[test]
    fn create_without_type_is_rejected() {
        let err = policy()
            .authorize(&host("ann"), &Document::new("x"), None)
            .unwrap_err();
        assert_eq!(err, SyncError::MissingType);
    }

    #[test]
    fn unregistered_create_is_default_deny() {
        let doc = Document::new("c1").with_type("comment");
        let err = policy().authorize(&host("ann"), &doc, None).unwrap_err();
        assert!(matches!(err, SyncError::Forbidden { gate: Gate::Role, .. }));

        let admin = MemoryHost::new(Principal::admin());
        let authorization = policy().authorize(&admin, &doc, None).unwrap();
        assert_eq!(authorization.checks, vec![RequirementCheck::DefaultDeny]);
    }

    #[test]
    fn delete_requires_old_revision() {
        let tombstone = Document::new("post1").deleted();
        let err = policy()
            .authorize(&host("ann"), &tombstone, None)
            .unwrap_err();
        assert_eq!(err, SyncError::DeleteOfNonexistent);
    }

    #[test]
    fn delete_requires_old_type() {
        let tombstone = Document::new("post1").deleted();
        let old = Document::new("post1");
        let err = policy()
            .authorize(&host("ann"), &tombstone, Some(&old))
            .unwrap_err();
        assert_eq!(err, SyncError::MissingType);
    }

    #[test]
    fn delete_checks_old_revision() {
        let tombstone = Document::new("post1").deleted();
        let old = Document::new("post1").with_type("post").with_owner("ann");
        let authorization = policy()
            .authorize(&host("ann"), &tombstone, Some(&old))
            .unwrap();
        assert_eq!(authorization.operation, Operation::Delete);
        assert_eq!(authorization.doc_type, "post");

        let err = policy()
            .authorize(&host("bob"), &tombstone, Some(&old))
            .unwrap_err();
        assert!(matches!(err, SyncError::Forbidden { gate: Gate::User, .. }));
    }

    #[test]
    fn type_change_is_rejected_before_requirements() {
        let old = profile("a@x");
        let new = profile("a@x").with_type("note");
        let admin = MemoryHost::new(Principal::admin());
        let err = policy().authorize(&admin, &new, Some(&old)).unwrap_err();
        assert_eq!(
            err,
            SyncError::TypeChanged {
                old: Some("profile".into()),
                new: Some("note".into()),
            }
        );

        let mut untyped_old = profile("a@x");
        untyped_old.doc_type = None;
        let err = policy().authorize(&admin, &old, Some(&untyped_old)).unwrap_err();
        assert_eq!(
            err,
            SyncError::TypeChanged {
                old: None,
                new: Some("profile".into()),
            }
        );
    }

    #[test]
    fn update_dropping_type_is_missing_type() {
        let old = profile("a@x");
        let mut untyped = profile("a@x");
        untyped.doc_type = None;
        let admin = MemoryHost::new(Principal::admin());
        let err = policy().authorize(&admin, &untyped, Some(&old)).unwrap_err();
        assert_eq!(err, SyncError::MissingType);
        assert_eq!(err.to_string(), "type not given");
    }

    #[test]
    fn update_without_any_type_is_missing_type() {
        let old = Document::new("x");
        let err = policy()
            .authorize(&host("ann"), &Document::new("x"), Some(&old))
            .unwrap_err();
        assert_eq!(err, SyncError::MissingType);
    }

    #[test]
    fn untouched_fields_skip_their_requirements() {
        let old = profile("a@x");
        let new = profile("a@x").with_field("name", json!("Alicia"));
        let authorization = policy().authorize(&host("mallory"), &new, Some(&old)).unwrap();
        assert_eq!(
            authorization.checks,
            vec![
                RequirementCheck::Skipped { index: 0 },
                RequirementCheck::Skipped { index: 1 },
            ]
        );
    }

    #[test]
    fn every_triggered_requirement_must_pass() {
        let old = profile("a@x");
        let new = profile("b@x");

        let owner = host("alice");
        let err = policy().authorize(&owner, &new, Some(&old)).unwrap_err();
        assert!(matches!(err, SyncError::Forbidden { gate: Gate::Role, .. }));

        let owner_moderator =
            MemoryHost::new(Principal::named("alice").with_roles(["moderator"]));
        let authorization = policy()
            .authorize(&owner_moderator, &new, Some(&old))
            .unwrap();
        assert_eq!(
            authorization.checks,
            vec![
                RequirementCheck::Passed {
                    index: 0,
                    triggered_by: Some("email".into())
                },
                RequirementCheck::Passed {
                    index: 1,
                    triggered_by: Some("email".into())
                },
            ]
        );
    }

    #[test]
    fn update_requirements_check_the_old_revision() {
        let old = Document::new("n1").with_type("note").with_owner("alice");
        let new = Document::new("n1").with_type("note").with_owner("mallory");
        let err = policy()
            .authorize(&host("mallory"), &new, Some(&old))
            .unwrap_err();
        assert!(matches!(err, SyncError::Forbidden { gate: Gate::User, .. }));
    }

    #[test]
    fn unconditional_update_requirement_always_runs() {
        let old = Document::new("n1").with_type("note").with_owner("alice");
        let err = policy()
            .authorize(&host("bob"), &old.clone(), Some(&old))
            .unwrap_err();
        assert!(matches!(err, SyncError::Forbidden { gate: Gate::User, .. }));
    }

    #[test]
    fn unregistered_update_is_default_deny() {
        let old = Document::new("post1").with_type("post");
        let new = old.clone().with_field("title", json!("t"));
        let err = policy()
            .authorize(&host("ann"), &new, Some(&old))
            .unwrap_err();
        assert!(matches!(err, SyncError::Forbidden { gate: Gate::Role, .. }));
    }

    #[test]
    fn joined_sequences_do_not_trigger_by_default() {
        let old = profile("a@x").with_field("badges", json!(["a", "bc"]));
        let new = profile("a@x").with_field("badges", json!(["ab", "c"]));
        let bob = host("bob");

        let authorization = policy().authorize(&bob, &new, Some(&old)).unwrap();
        assert_eq!(
            authorization.checks[1],
            RequirementCheck::Skipped { index: 1 }
        );

        let strict = policy().with_sequence_equality(SequenceEquality::ElementWise);
        let err = strict.authorize(&bob, &new, Some(&old)).unwrap_err();
        assert!(matches!(err, SyncError::Forbidden { gate: Gate::Role, .. }));
    }

    #[test]
    fn rejected_sync_emits_nothing() {
        let post = Document::new("post1")
            .with_type("post")
            .with_channels(["news"])
            .with_access(["bob"]);
        let policy = policy().with_access_types(["post"]);
        let mut bob = host("bob");
        assert!(policy.sync(&mut bob, &post, None).is_err());
        assert!(bob.grants().is_empty());
        assert!(bob.assigned_channels().is_empty());
    }

    #[test]
    fn outcome_serializes_flat() {
        let post = Document::new("post1").with_type("post").with_channels(["news"]);
        let mut author = MemoryHost::new(Principal::named("ann").with_roles(["author"]));
        let outcome = policy().sync(&mut author, &post, None).unwrap();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "operation": "create",
                "docId": "post1",
                "docType": "post",
                "checks": [{"kind": "passed", "index": 0}],
                "emission": {"grants": [], "channels": ["news"]}
            })
        );
    }
}
