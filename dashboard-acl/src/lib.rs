// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access-control lists for dashboards and folders.
//!
//! Permission updates replace the whole list of a resource. The submitted list is validated,
//! authorized by a [`Guardian`](traits::Guardian), extended with the hidden entries the guardian
//! requires and then diffed against the current list. The result is a batch of grant and revoke
//! commands which is handed to the permission store of the resource kind.
pub mod command;
pub mod config;
pub mod entry;
pub mod permission;
pub mod reconcile;
pub mod service;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod traits;
pub mod validate;

pub use command::{SetResourcePermissionCommand, build_commands};
pub use config::{AccessControlMode, Config};
pub use entry::{AclInfo, AclItem, BuiltinRole, PermissionEntry, Resource, SignedInUser, Subject};
pub use permission::PermissionLevel;
pub use reconcile::{ReconcileCommand, reconcile};
pub use service::{ListError, Permissions, UpdateError};
pub use validate::{ValidationError, validate_items};
