// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access-control entries, the subjects they are granted to and the resources they protect.
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::permission::PermissionLevel;

/// Numeric identifier of a user, `0` means "no user".
pub type UserId = i64;

/// Numeric identifier of a team, `0` means "no team".
pub type TeamId = i64;

/// Numeric identifier of an organisation.
pub type OrgId = i64;

/// Numeric identifier of a dashboard or folder.
pub type ResourceId = i64;

/// Name of a built-in organisation role, for example "Viewer", "Editor" or "Admin".
///
/// Roles are compared by exact string equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BuiltinRole(String);

impl BuiltinRole {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn viewer() -> Self {
        Self::new("Viewer")
    }

    pub fn editor() -> Self {
        Self::new("Editor")
    }

    pub fn admin() -> Self {
        Self::new("Admin")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BuiltinRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BuiltinRole {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Holder of a permission.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    User(UserId),
    Team(TeamId),
    Role(BuiltinRole),
}

impl Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::User(id) => write!(f, "user:{}", id),
            Subject::Team(id) => write!(f, "team:{}", id),
            Subject::Role(role) => write!(f, "role:{}", role),
        }
    }
}

/// Returns the single subject designated by the given fields.
///
/// Returns `None` when no designator or more than one designator is populated. Only positive ids
/// count as populated.
pub(crate) fn single_subject(
    user_id: UserId,
    team_id: TeamId,
    role: Option<&BuiltinRole>,
) -> Option<Subject> {
    match (user_id > 0, team_id > 0, role) {
        (true, false, None) => Some(Subject::User(user_id)),
        (false, true, None) => Some(Subject::Team(team_id)),
        (false, false, Some(role)) => Some(Subject::Role(role.clone())),
        _ => None,
    }
}

/// One permission item of an update request, as submitted by a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AclItem {
    #[cfg_attr(feature = "serde", serde(default))]
    pub user_id: UserId,

    #[cfg_attr(feature = "serde", serde(default))]
    pub team_id: TeamId,

    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Option<BuiltinRole>,

    pub permission: PermissionLevel,
}

impl AclItem {
    pub fn user(user_id: UserId, permission: PermissionLevel) -> Self {
        Self {
            user_id,
            team_id: 0,
            role: None,
            permission,
        }
    }

    pub fn team(team_id: TeamId, permission: PermissionLevel) -> Self {
        Self {
            user_id: 0,
            team_id,
            role: None,
            permission,
        }
    }

    pub fn role(role: BuiltinRole, permission: PermissionLevel) -> Self {
        Self {
            user_id: 0,
            team_id: 0,
            role: Some(role),
            permission,
        }
    }

    pub fn subject(&self) -> Option<Subject> {
        single_subject(self.user_id, self.team_id, self.role.as_ref())
    }
}

/// A single grant on a dashboard or folder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PermissionEntry {
    pub org_id: OrgId,

    /// Dashboard or folder this entry applies to.
    pub dashboard_id: ResourceId,

    pub user_id: UserId,

    pub team_id: TeamId,

    pub role: Option<BuiltinRole>,

    pub permission: PermissionLevel,

    /// Unix timestamp in seconds.
    pub created: u64,

    /// Unix timestamp in seconds.
    pub updated: u64,
}

impl PermissionEntry {
    /// Stamps an item of an update request with the resource it belongs to.
    ///
    /// Creation and update time are both set to now.
    pub fn from_item(resource: &Resource, item: &AclItem) -> Self {
        let now = current_timestamp();
        Self {
            org_id: resource.org_id,
            dashboard_id: resource.id,
            user_id: item.user_id,
            team_id: item.team_id,
            role: item.role.clone(),
            permission: item.permission,
            created: now,
            updated: now,
        }
    }

    pub fn subject(&self) -> Option<Subject> {
        single_subject(self.user_id, self.team_id, self.role.as_ref())
    }
}

/// Current permission entry of a resource, enriched with display metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AclInfo {
    pub org_id: OrgId,
    pub dashboard_id: ResourceId,
    pub folder_id: ResourceId,
    pub created: u64,
    pub updated: u64,

    pub user_id: UserId,
    pub user_login: String,
    pub user_email: String,
    pub user_avatar_url: String,

    pub team_id: TeamId,
    pub team_email: String,
    pub team_avatar_url: String,
    pub team: String,

    pub role: Option<BuiltinRole>,
    pub permission: Option<PermissionLevel>,
    pub permission_name: String,

    pub uid: String,
    pub title: String,
    pub slug: String,
    pub is_folder: bool,
    pub url: String,

    /// Entry is inherited from a parent folder.
    pub inherited: bool,
}

impl AclInfo {
    pub fn subject(&self) -> Option<Subject> {
        single_subject(self.user_id, self.team_id, self.role.as_ref())
    }
}

/// Dashboard or folder whose permissions are read or updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub org_id: OrgId,
    pub id: ResourceId,
    pub uid: String,
    pub is_folder: bool,
}

impl Resource {
    pub fn dashboard(org_id: OrgId, id: ResourceId, uid: impl Into<String>) -> Self {
        Self {
            org_id,
            id,
            uid: uid.into(),
            is_folder: false,
        }
    }

    pub fn folder(org_id: OrgId, id: ResourceId, uid: impl Into<String>) -> Self {
        Self {
            org_id,
            id,
            uid: uid.into(),
            is_folder: true,
        }
    }
}

/// Principal acting on a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedInUser {
    pub user_id: UserId,
    pub org_id: OrgId,
    pub login: String,
}

/// Relative URL of a dashboard or folder page.
pub fn resource_url(is_folder: bool, uid: &str, slug: &str) -> String {
    if is_folder {
        format!("/dashboards/f/{}/{}", uid, slug)
    } else {
        format!("/d/{}/{}", uid, slug)
    }
}

pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default()
}
