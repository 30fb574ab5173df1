// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::RefCell;
use std::rc::Rc;

use crate::command::SetResourcePermissionCommand;
use crate::entry::{OrgId, PermissionEntry, ResourceId};
use crate::test_utils::MockError;
use crate::traits::{LegacyAclError, LegacyAclStore, ResourcePermissions};

/// Batch of commands received by a permission store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedBatch {
    pub org_id: OrgId,
    pub uid: String,
    pub commands: Vec<SetResourcePermissionCommand>,
}

#[derive(Debug, Default)]
struct PermissionsState {
    fail: bool,
    batches: Vec<AppliedBatch>,
}

/// In-memory resource permission store recording every applied batch.
///
/// Clones share their state.
#[derive(Clone, Debug, Default)]
pub struct MemoryPermissions {
    inner: Rc<RefCell<PermissionsState>>,
}

impl MemoryPermissions {
    /// Reject all following batches.
    pub fn fail(&self) {
        self.inner.borrow_mut().fail = true;
    }

    pub fn batches(&self) -> Vec<AppliedBatch> {
        self.inner.borrow().batches.clone()
    }

    /// Commands of the only applied batch.
    pub fn single_batch(&self) -> Vec<SetResourcePermissionCommand> {
        let batches = self.batches();
        assert_eq!(batches.len(), 1, "expected exactly one batch");
        batches[0].commands.clone()
    }
}

impl ResourcePermissions for MemoryPermissions {
    type Error = MockError;

    async fn set_permissions(
        &self,
        org_id: OrgId,
        uid: &str,
        commands: Vec<SetResourcePermissionCommand>,
    ) -> Result<(), Self::Error> {
        let mut state = self.inner.borrow_mut();
        if state.fail {
            return Err(MockError("permission store unavailable".into()));
        }

        state.batches.push(AppliedBatch {
            org_id,
            uid: uid.to_string(),
            commands,
        });
        Ok(())
    }
}

/// Answer of the legacy store to an update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LegacyOutcome {
    #[default]
    Accept,
    AclInfoMissing,
    DashboardEmpty,
    Fail,
}

#[derive(Debug, Default)]
struct LegacyState {
    outcome: LegacyOutcome,
    acl: Vec<(ResourceId, Vec<PermissionEntry>)>,
}

/// In-memory list-based ACL store.
#[derive(Clone, Debug, Default)]
pub struct MemoryLegacyStore {
    inner: Rc<RefCell<LegacyState>>,
}

impl MemoryLegacyStore {
    pub fn set_outcome(&self, outcome: LegacyOutcome) {
        self.inner.borrow_mut().outcome = outcome;
    }

    /// All lists written so far, keyed by dashboard id.
    pub fn updates(&self) -> Vec<(ResourceId, Vec<PermissionEntry>)> {
        self.inner.borrow().acl.clone()
    }
}

impl LegacyAclStore for MemoryLegacyStore {
    type Error = MockError;

    async fn update_dashboard_acl(
        &self,
        dashboard_id: ResourceId,
        entries: Vec<PermissionEntry>,
    ) -> Result<(), LegacyAclError<Self::Error>> {
        let mut state = self.inner.borrow_mut();
        match state.outcome {
            LegacyOutcome::Accept => {
                state.acl.push((dashboard_id, entries));
                Ok(())
            }
            LegacyOutcome::AclInfoMissing => Err(LegacyAclError::AclInfoMissing),
            LegacyOutcome::DashboardEmpty => Err(LegacyAclError::DashboardEmpty),
            LegacyOutcome::Fail => Err(LegacyAclError::Internal(MockError(
                "acl store unavailable".into(),
            ))),
        }
    }
}
