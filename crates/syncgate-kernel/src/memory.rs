//! In-memory host for tests, fixtures, and the CLI.
//!
//! The principal is described up front (name, roles, channel access, admin
//! flag); grants and channel assignments are recorded in the order they
//! were first asserted, with repeats ignored.

use crate::error::Denial;
use crate::grants::Grant;
use crate::host::SyncHost;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The identity attempting a write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Principal {
    /// User name; empty for an anonymous principal.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Channels the principal can access.
    #[serde(default)]
    pub channels: BTreeSet<String>,
    /// Administrative context: every gate passes.
    #[serde(default)]
    pub admin: bool,
}

impl Principal {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn admin() -> Self {
        Self {
            admin: true,
            ..Self::default()
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels.extend(channels.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    principal: Principal,
    grants: Vec<Grant>,
    assigned: Vec<String>,
}

impl MemoryHost {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            ..Self::default()
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Grants asserted so far, first assertion order.
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Channels the current document was routed into, first assertion order.
    pub fn assigned_channels(&self) -> &[String] {
        &self.assigned
    }
}

impl SyncHost for MemoryHost {
    fn require_role(&self, roles: &[String]) -> Result<(), Denial> {
        if self.principal.admin {
            return Ok(());
        }
        if roles.is_empty() {
            return Err(Denial::new("administrator privilege required"));
        }
        if roles.iter().any(|role| self.principal.roles.contains(role)) {
            Ok(())
        } else {
            Err(Denial::new(format!(
                "missing role: requires one of [{}]",
                roles.join(", ")
            )))
        }
    }

    fn require_user(&self, name: &str) -> Result<(), Denial> {
        if self.principal.admin || self.principal.name == name {
            Ok(())
        } else {
            Err(Denial::new(format!("wrong user: requires `{name}`")))
        }
    }

    fn require_access(&self, channels: &[String]) -> Result<(), Denial> {
        if self.principal.admin {
            return Ok(());
        }
        let missing: Vec<&str> = channels
            .iter()
            .filter(|channel| !self.principal.channels.contains(*channel))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Denial::new(format!(
                "missing channel access: [{}]",
                missing.join(", ")
            )))
        }
    }

    fn grant_access(&mut self, principals: &[String], channel: &str) {
        for principal in principals {
            let grant = Grant::new(principal.as_str(), channel);
            if !self.grants.contains(&grant) {
                self.grants.push(grant);
            }
        }
    }

    fn assign_channels(&mut self, channels: &[String]) {
        for channel in channels {
            if !self.assigned.contains(channel) {
                self.assigned.push(channel.clone());
            }
        }
    }
}
