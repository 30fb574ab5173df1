// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use thiserror::Error;

use crate::config::Config;
use crate::entry::{AclInfo, PermissionEntry, Resource, SignedInUser};
use crate::permission::PermissionLevel;

/// Failures reported by a guardian.
///
/// `PermissionExists` and `Override` are problems of the submitted list which the caller can fix,
/// everything else is carried by `Internal`.
#[derive(Debug, Error)]
pub enum GuardianError<E> {
    #[error("permission already exists")]
    PermissionExists,

    #[error("you can only override a permission to be higher")]
    Override,

    #[error(transparent)]
    Internal(E),
}

/// Authorization decisions about one dashboard or folder.
///
/// Implementations wrap the authorization service of the dashboard backend. The service in this
/// crate never decides by itself if a principal may administer a resource, it always asks the
/// guardian.
pub trait Guardian {
    type Error: Error + Send + Sync + 'static;

    /// Returns `true` if the user may administer the permissions of the resource.
    fn can_admin(
        &self,
        resource: &Resource,
        user: &SignedInUser,
    ) -> impl Future<Output = Result<bool, GuardianError<Self::Error>>>;

    /// Returns the entries which must always be present on the resource.
    ///
    /// These usually grant access to hidden service accounts, they are appended to every
    /// submitted list and can thus not be removed by leaving them out.
    fn hidden_acl(
        &self,
        resource: &Resource,
        config: &Config,
    ) -> impl Future<Output = Result<Vec<PermissionEntry>, GuardianError<Self::Error>>>;

    /// Returns `true` if it is safe to replace the permissions of the resource with the given
    /// entries.
    ///
    /// Returns `false` when the user would lose the given permission level on the resource, for
    /// example by removing their own last admin entry.
    fn check_permission_before_update(
        &self,
        resource: &Resource,
        user: &SignedInUser,
        permission: PermissionLevel,
        entries: &[PermissionEntry],
    ) -> impl Future<Output = Result<bool, GuardianError<Self::Error>>>;

    /// Returns the current permissions of the resource, including inherited ones.
    fn acl(
        &self,
        resource: &Resource,
        user: &SignedInUser,
    ) -> impl Future<Output = Result<Vec<AclInfo>, GuardianError<Self::Error>>>;

    /// Returns the current permissions of the resource, dropping inherited entries which are
    /// overridden by an entry on the resource itself.
    fn acl_without_duplicates(
        &self,
        resource: &Resource,
        user: &SignedInUser,
    ) -> impl Future<Output = Result<Vec<AclInfo>, GuardianError<Self::Error>>>;
}
