//! # syncgate-acl
//!
//! ACL declarations authored per document type, and their compilation into
//! the requirement registry and access-type set a [`SyncPolicy`] carries.
//!
//! [`SyncPolicy`]: syncgate_kernel::SyncPolicy

pub mod compile;
pub mod declaration;

pub use compile::{AclError, compile, compile_path, compile_toml_str};
pub use declaration::{AclManifest, RequirementDecl, RoleDecl, RoleKeyword, TypeAcl};
