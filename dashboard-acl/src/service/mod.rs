// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read and update the permissions of dashboards and folders.
use std::error::Error;

use thiserror::Error;
use tracing::{debug, warn};

use crate::command::build_commands;
use crate::config::Config;
use crate::entry::{AclInfo, AclItem, PermissionEntry, Resource, SignedInUser, resource_url};
use crate::permission::PermissionLevel;
use crate::reconcile::reconcile;
use crate::traits::{
    AvatarUrls, Guardian, GuardianError, LegacyAclError, LegacyAclStore, ResourcePermissions,
};
use crate::validate::{ValidationError, validate_items};

#[cfg(test)]
mod tests;

type BoxedError = Box<dyn Error + Send + Sync + 'static>;

/// Reasons for refusing a caller.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DenyReason {
    #[error("Access denied to this dashboard")]
    NotAdmin,

    #[error("Cannot remove own admin permission for a folder")]
    CannotRemoveOwnAdmin,
}

/// Problems of a submitted list which were detected by the guardian or the legacy store.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConflictReason {
    #[error("permission already exists")]
    PermissionExists,

    #[error("you can only override a permission to be higher")]
    Override,

    #[error("user id and team id cannot both be empty")]
    AclInfoMissing,

    #[error("dashboard id must be greater than zero")]
    DashboardEmpty,
}

/// Infrastructure failures of the guardian or the permission stores.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("error while checking dashboard permissions: {0}")]
    CanAdmin(BoxedError),

    #[error("error while retrieving hidden permissions: {0}")]
    HiddenAcl(BoxedError),

    #[error("error while checking dashboard permissions: {0}")]
    CheckPermission(BoxedError),

    #[error("failed to get dashboard permissions: {0}")]
    FetchAcl(BoxedError),

    #[error("failed to update permissions: {0}")]
    ApplyCommands(BoxedError),

    #[error("failed to create permission: {0}")]
    LegacyUpdate(BoxedError),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    AuthorizationDenied(DenyReason),

    #[error("{0}")]
    Conflict(ConflictReason),

    #[error(transparent)]
    Dependency(#[from] DependencyError),
}

impl UpdateError {
    /// HTTP status code class of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            UpdateError::Validation(_) => 400,
            UpdateError::AuthorizationDenied(_) => 403,
            UpdateError::Conflict(ConflictReason::PermissionExists | ConflictReason::Override) => {
                400
            }
            UpdateError::Conflict(
                ConflictReason::AclInfoMissing | ConflictReason::DashboardEmpty,
            ) => 409,
            UpdateError::Dependency(_) => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error("{0}")]
    AuthorizationDenied(DenyReason),

    #[error(transparent)]
    Dependency(#[from] DependencyError),
}

impl ListError {
    /// HTTP status code class of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ListError::AuthorizationDenied(_) => 403,
            ListError::Dependency(_) => 500,
        }
    }
}

/// Permission handling for dashboards and folders.
///
/// Updates replace the whole permission list of a resource: entries which are not part of the
/// submitted list are removed, except for the hidden entries the guardian forces into every
/// update. Each call is independent, the service keeps no state besides its configuration.
///
/// Dropping a returned future cancels any pending guardian or store call. Commands are only
/// applied once the permission store reported success.
#[derive(Debug)]
pub struct Permissions<G, D, F, L, A> {
    config: Config,
    guardian: G,
    dashboards: D,
    folders: F,
    legacy: L,
    avatars: A,
}

impl<G, D, F, L, A> Permissions<G, D, F, L, A>
where
    G: Guardian,
    D: ResourcePermissions,
    F: ResourcePermissions,
    L: LegacyAclStore,
    A: AvatarUrls,
{
    pub fn new(
        config: Config,
        guardian: G,
        dashboards: D,
        folders: F,
        legacy: L,
        avatars: A,
    ) -> Self {
        Self {
            config,
            guardian,
            dashboards,
            folders,
            legacy,
            avatars,
        }
    }

    /// Returns the permissions of a resource as shown to the given user.
    ///
    /// Entries of hidden users are left out unless the user is looking at their own entry.
    pub async fn list(
        &self,
        resource: &Resource,
        user: &SignedInUser,
    ) -> Result<Vec<AclInfo>, ListError> {
        if !self.can_admin(resource, user).await? {
            return Err(ListError::AuthorizationDenied(DenyReason::NotAdmin));
        }

        let acl = self
            .guardian
            .acl_without_duplicates(resource, user)
            .await
            .map_err(|err| DependencyError::FetchAcl(Box::new(err)))?;

        let filtered = acl
            .into_iter()
            .filter(|info| {
                !(info.user_id > 0 && self.config.is_hidden_user(&info.user_login, user))
            })
            .map(|info| self.decorate(info))
            .collect();

        Ok(filtered)
    }

    /// Replaces the permissions of a resource with the given items.
    ///
    /// Items are validated before any other service is contacted. Returns `Ok` once all
    /// permission changes have been applied.
    pub async fn update(
        &self,
        resource: &Resource,
        user: &SignedInUser,
        items: &[AclItem],
    ) -> Result<(), UpdateError> {
        validate_items(items)?;

        if !self.can_admin(resource, user).await? {
            warn!(
                user_id = user.user_id,
                uid = %resource.uid,
                "permission update denied, user can not administer resource"
            );
            return Err(UpdateError::AuthorizationDenied(DenyReason::NotAdmin));
        }

        let mut desired: Vec<PermissionEntry> = items
            .iter()
            .map(|item| PermissionEntry::from_item(resource, item))
            .collect();

        let hidden = self
            .guardian
            .hidden_acl(resource, &self.config)
            .await
            .map_err(|err| DependencyError::HiddenAcl(Box::new(err)))?;
        desired.extend(hidden);

        match self
            .guardian
            .check_permission_before_update(resource, user, PermissionLevel::Admin, &desired)
            .await
        {
            Ok(true) => (),
            Ok(false) => {
                warn!(
                    user_id = user.user_id,
                    uid = %resource.uid,
                    "permission update denied, user would remove own admin permission"
                );
                return Err(UpdateError::AuthorizationDenied(
                    DenyReason::CannotRemoveOwnAdmin,
                ));
            }
            Err(GuardianError::PermissionExists) => {
                return Err(UpdateError::Conflict(ConflictReason::PermissionExists));
            }
            Err(GuardianError::Override) => {
                return Err(UpdateError::Conflict(ConflictReason::Override));
            }
            Err(err) => return Err(DependencyError::CheckPermission(Box::new(err)).into()),
        }

        if self.config.is_legacy() {
            return self.update_legacy(resource, desired).await;
        }

        let current = self
            .guardian
            .acl(resource, user)
            .await
            .map_err(|err| DependencyError::FetchAcl(Box::new(err)))?;

        let commands = build_commands(&reconcile(&desired, &current));
        debug!(
            uid = %resource.uid,
            is_folder = resource.is_folder,
            commands = commands.len(),
            "apply permission commands"
        );

        let result = if resource.is_folder {
            self.folders
                .set_permissions(resource.org_id, &resource.uid, commands)
                .await
                .map_err(|err| DependencyError::ApplyCommands(Box::new(err)))
        } else {
            self.dashboards
                .set_permissions(resource.org_id, &resource.uid, commands)
                .await
                .map_err(|err| DependencyError::ApplyCommands(Box::new(err)))
        };

        Ok(result?)
    }

    async fn update_legacy(
        &self,
        resource: &Resource,
        desired: Vec<PermissionEntry>,
    ) -> Result<(), UpdateError> {
        debug!(
            dashboard_id = resource.id,
            entries = desired.len(),
            "replace permissions in legacy acl store"
        );

        match self.legacy.update_dashboard_acl(resource.id, desired).await {
            Ok(()) => Ok(()),
            Err(LegacyAclError::AclInfoMissing) => {
                Err(UpdateError::Conflict(ConflictReason::AclInfoMissing))
            }
            Err(LegacyAclError::DashboardEmpty) => {
                Err(UpdateError::Conflict(ConflictReason::DashboardEmpty))
            }
            Err(err) => Err(DependencyError::LegacyUpdate(Box::new(err)).into()),
        }
    }

    async fn can_admin(
        &self,
        resource: &Resource,
        user: &SignedInUser,
    ) -> Result<bool, DependencyError> {
        self.guardian
            .can_admin(resource, user)
            .await
            .map_err(|err| DependencyError::CanAdmin(Box::new(err)))
    }

    fn decorate(&self, mut info: AclInfo) -> AclInfo {
        info.user_avatar_url = self.avatars.gravatar_url(&info.user_email);

        if info.team_id > 0 {
            info.team_avatar_url = self
                .avatars
                .gravatar_url_with_default(&info.team_email, &info.team);
        }

        if !info.slug.is_empty() {
            info.url = resource_url(info.is_folder, &info.uid, &info.slug);
        }

        info
    }
}
