// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entry::{TeamId, UserId};
use crate::reconcile::ReconcileCommand;

/// Permission assignment in the shape consumed by the resource permission services.
///
/// Exactly one of `user_id`, `team_id` and `builtin_role` names the subject, an empty
/// `builtin_role` means "no role". An empty `permission` removes all permissions of the subject.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SetResourcePermissionCommand {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub builtin_role: String,
    pub permission: String,
}

impl SetResourcePermissionCommand {
    pub fn is_revoke(&self) -> bool {
        self.permission.is_empty()
    }
}

impl From<&ReconcileCommand> for SetResourcePermissionCommand {
    fn from(command: &ReconcileCommand) -> Self {
        Self {
            user_id: command.user_id,
            team_id: command.team_id,
            builtin_role: command
                .role
                .as_ref()
                .map(|role| role.as_str().to_owned())
                .unwrap_or_default(),
            permission: command
                .permission
                .map(|level| level.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Converts reconciliation output into the sink's command batch, keeping the order.
pub fn build_commands(commands: &[ReconcileCommand]) -> Vec<SetResourcePermissionCommand> {
    commands
        .iter()
        .map(SetResourcePermissionCommand::from)
        .collect()
}
