// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait interfaces for the layers persisting permissions.
use std::error::Error;

use thiserror::Error;

use crate::command::SetResourcePermissionCommand;
use crate::entry::{OrgId, PermissionEntry, ResourceId};

/// Applies permission assignments to dashboards or folders.
///
/// One implementation exists per resource kind. A batch is applied as a whole: when the returned
/// future resolves to an error, none of the commands should be considered applied.
/// Implementations are expected to serialise concurrent batches for the same resource.
pub trait ResourcePermissions {
    type Error: Error + Send + Sync + 'static;

    fn set_permissions(
        &self,
        org_id: OrgId,
        uid: &str,
        commands: Vec<SetResourcePermissionCommand>,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Failures reported by a list-based ACL store.
#[derive(Debug, Error)]
pub enum LegacyAclError<E> {
    #[error("user id and team id cannot both be empty")]
    AclInfoMissing,

    #[error("dashboard id must be greater than zero")]
    DashboardEmpty,

    #[error(transparent)]
    Internal(E),
}

/// List-based ACL store, used when resource permissions are disabled.
///
/// The store replaces the whole list of a dashboard with the given entries.
pub trait LegacyAclStore {
    type Error: Error + Send + Sync + 'static;

    fn update_dashboard_acl(
        &self,
        dashboard_id: ResourceId,
        entries: Vec<PermissionEntry>,
    ) -> impl Future<Output = Result<(), LegacyAclError<Self::Error>>>;
}
