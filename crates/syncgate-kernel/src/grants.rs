//! Grants emitted by an accepted write.
//!
//! Documents whose type is an access type act as ACLs for themselves: every
//! user or group listed in `access` is granted the channel named after the
//! document id. Every document is routed into its declared channels. Both
//! are restated on each write rather than tracked as deltas.

use crate::document::Document;
use crate::host::SyncHost;
use crate::policy::SyncPolicy;
use serde::Serialize;
use tracing::info;

/// One user or group granted access to one channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Grant {
    pub principal: String,
    pub channel: String,
}

impl Grant {
    pub fn new(principal: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            channel: channel.into(),
        }
    }
}

/// Everything handed to the host for one accepted write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Emission {
    pub grants: Vec<Grant>,
    pub channels: Vec<String>,
}

impl SyncPolicy {
    /// Emit the grants and channel assignment for `doc`.
    ///
    /// Only call this once the write has been authorized;
    /// [`SyncPolicy::sync`] does both in the right order.
    pub fn emit_grants<H>(&self, host: &mut H, doc: &Document) -> Emission
    where
        H: SyncHost + ?Sized,
    {
        let mut emission = Emission::default();

        if let Some(doc_type) = doc.doc_type()
            && self.grants_access(doc_type)
        {
            let access = doc.access();
            info!(doc_id = %doc.id, ?access, "granting access");
            host.grant_access(access, &doc.id);
            emission.grants = access
                .iter()
                .map(|principal| Grant::new(principal.as_str(), doc.id.as_str()))
                .collect();
        }

        host.assign_channels(doc.channels());
        emission.channels = doc.channels().to_vec();
        emission
    }
}
