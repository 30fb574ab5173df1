// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diff a desired access-control list against the current one.
//!
//! Every desired entry is (re-)granted and every current entry which is not matched by a desired
//! entry is revoked. Unchanged entries are granted again, the permission sink treats repeated
//! grants as no-ops.
use std::collections::HashSet;

use tracing::trace;

use crate::entry::{
    AclInfo, BuiltinRole, PermissionEntry, Subject, TeamId, UserId, single_subject,
};
use crate::permission::PermissionLevel;

/// Grant or revoke of a permission for one subject.
///
/// The subject designators are kept as they were found on the source entry, at most one of them
/// is populated for entries which passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileCommand {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub role: Option<BuiltinRole>,

    /// Level to grant, `None` revokes any permission of the subject.
    pub permission: Option<PermissionLevel>,
}

impl ReconcileCommand {
    pub fn grant(entry: &PermissionEntry) -> Self {
        Self {
            user_id: entry.user_id,
            team_id: entry.team_id,
            role: entry.role.clone(),
            permission: Some(entry.permission),
        }
    }

    pub fn revoke(entry: &AclInfo) -> Self {
        Self {
            user_id: entry.user_id,
            team_id: entry.team_id,
            role: entry.role.clone(),
            permission: None,
        }
    }

    pub fn is_revoke(&self) -> bool {
        self.permission.is_none()
    }

    /// Subject of this command, following the same rule as [`AclItem::subject`].
    ///
    /// [`AclItem::subject`]: crate::entry::AclItem::subject
    pub fn subject(&self) -> Option<Subject> {
        single_subject(self.user_id, self.team_id, self.role.as_ref())
    }
}

/// Subjects named by a set of desired entries.
///
/// An entry contributes a key for every designator it has populated, zero ids are never keys.
#[derive(Debug, Default)]
struct SubjectKeys(HashSet<Subject>);

impl SubjectKeys {
    fn from_entries(entries: &[PermissionEntry]) -> Self {
        let mut keys = HashSet::with_capacity(entries.len());
        for entry in entries {
            if entry.user_id != 0 {
                keys.insert(Subject::User(entry.user_id));
            }
            if entry.team_id != 0 {
                keys.insert(Subject::Team(entry.team_id));
            }
            if let Some(role) = &entry.role {
                keys.insert(Subject::Role(role.clone()));
            }
        }
        Self(keys)
    }

    /// Returns `true` if any designator of the current entry is named by a desired entry.
    fn matches(&self, current: &AclInfo) -> bool {
        if current.user_id != 0 && self.0.contains(&Subject::User(current.user_id)) {
            return true;
        }

        if current.team_id != 0 && self.0.contains(&Subject::Team(current.team_id)) {
            return true;
        }

        match &current.role {
            Some(role) => self.0.contains(&Subject::Role(role.clone())),
            None => false,
        }
    }
}

/// Computes the commands moving the current access-control list to the desired one.
///
/// Grants come first, in the order of `desired`, followed by revokes in the order of `current`.
/// Roles survive only when a desired entry carries the exact same role name.
pub fn reconcile(desired: &[PermissionEntry], current: &[AclInfo]) -> Vec<ReconcileCommand> {
    let mut commands: Vec<ReconcileCommand> =
        desired.iter().map(ReconcileCommand::grant).collect();

    let keys = SubjectKeys::from_entries(desired);
    for entry in current {
        if keys.matches(entry) {
            continue;
        }

        trace!(
            user_id = entry.user_id,
            team_id = entry.team_id,
            role = ?entry.role,
            "revoke permission missing from desired list"
        );
        commands.push(ReconcileCommand::revoke(entry));
    }

    commands
}
