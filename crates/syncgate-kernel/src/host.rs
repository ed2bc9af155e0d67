//! The host interface the sync function runs against.

use crate::error::Denial;

/// Authorization and grant primitives provided by the embedding store.
///
/// The `require_*` methods judge the acting principal of the current write
/// and return a [`Denial`] to refuse it. The grant methods are declarative:
/// asserting the same grant on every write of a document is expected, so
/// implementations must be idempotent.
pub trait SyncHost {
    /// Refuse unless the principal holds at least one of `roles`. An empty
    /// slice can only be satisfied with administrative privilege.
    fn require_role(&self, roles: &[String]) -> Result<(), Denial>;

    /// Refuse unless the principal is `name`.
    fn require_user(&self, name: &str) -> Result<(), Denial>;

    /// Refuse unless the principal can access every one of `channels`.
    fn require_access(&self, channels: &[String]) -> Result<(), Denial>;

    /// Grant each user or group in `principals` access to `channel`.
    fn grant_access(&mut self, principals: &[String], channel: &str);

    /// Route the current document into `channels`.
    fn assign_channels(&mut self, channels: &[String]);
}
