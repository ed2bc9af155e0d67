//! # syncgate kernel
//!
//! Per-write authorization for a replicated document store. The store calls
//! the sync function once for every proposed create, update, or delete;
//! the function either accepts the write (and declares the channel grants
//! it implies) or rejects it with a reason.
//!
//! ## Architecture
//!
//! ```text
//! SyncPolicy            ← registry + access types, loaded once, immutable
//!     │
//! authorize             ← classify create/update/delete, pick requirements
//!     │
//! first_changed         ← update only: which field-scoped requirements fire
//!     │
//! check                 ← owner → access → user → role gates via SyncHost
//!     │
//! emit_grants           ← access-list grants + channel assignment
//! ```
//!
//! The role, user, and channel judgments themselves belong to the host and
//! are reached through the [`SyncHost`] trait. [`MemoryHost`] is an
//! in-memory implementation for tests and tooling.

pub mod change;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod grants;
pub mod host;
pub mod memory;
pub mod policy;
pub mod registry;
pub mod requirement;

pub use change::{SequenceEquality, changed, field_changed, first_changed};
pub use dispatch::{Authorization, RequirementCheck, SyncOutcome};
pub use document::Document;
pub use error::{Denial, Gate, SyncError};
pub use evaluator::{check, require_admin};
pub use grants::{Emission, Grant};
pub use host::SyncHost;
pub use memory::{MemoryHost, Principal};
pub use policy::{PolicyError, SyncPolicy};
pub use registry::{Lookup, RequirementRegistry};
pub use requirement::{Operation, Requirement};
