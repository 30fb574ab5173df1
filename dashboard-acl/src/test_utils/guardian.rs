// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Config;
use crate::entry::{AclInfo, PermissionEntry, Resource, SignedInUser};
use crate::permission::PermissionLevel;
use crate::test_utils::MockError;
use crate::traits::{Guardian, GuardianError};

/// Answer of the mock guardian to `check_permission_before_update`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckOutcome {
    #[default]
    Allow,
    Deny,
    PermissionExists,
    Override,
    Fail,
}

#[derive(Debug)]
struct GuardianState {
    can_admin: Option<bool>,
    hidden: Option<Vec<PermissionEntry>>,
    check: CheckOutcome,
    acl: Option<Vec<AclInfo>>,
    calls: Vec<&'static str>,
    checked: Vec<PermissionEntry>,
}

impl Default for GuardianState {
    fn default() -> Self {
        Self {
            can_admin: Some(true),
            hidden: Some(Vec::new()),
            check: CheckOutcome::Allow,
            acl: Some(Vec::new()),
            calls: Vec::new(),
            checked: Vec::new(),
        }
    }
}

/// Guardian with scripted answers which records every call made to it.
///
/// Clones share their state.
#[derive(Clone, Debug, Default)]
pub struct MockGuardian {
    inner: Rc<RefCell<GuardianState>>,
}

impl MockGuardian {
    pub fn set_can_admin(&self, can_admin: bool) {
        self.inner.borrow_mut().can_admin = Some(can_admin);
    }

    pub fn fail_can_admin(&self) {
        self.inner.borrow_mut().can_admin = None;
    }

    pub fn set_hidden(&self, hidden: Vec<PermissionEntry>) {
        self.inner.borrow_mut().hidden = Some(hidden);
    }

    pub fn fail_hidden(&self) {
        self.inner.borrow_mut().hidden = None;
    }

    pub fn set_check(&self, check: CheckOutcome) {
        self.inner.borrow_mut().check = check;
    }

    pub fn set_acl(&self, acl: Vec<AclInfo>) {
        self.inner.borrow_mut().acl = Some(acl);
    }

    pub fn fail_acl(&self) {
        self.inner.borrow_mut().acl = None;
    }

    /// Names of all guardian methods called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.borrow().calls.clone()
    }

    /// Entries handed to the last `check_permission_before_update` call.
    pub fn checked_entries(&self) -> Vec<PermissionEntry> {
        self.inner.borrow().checked.clone()
    }

    fn record(&self, call: &'static str) {
        self.inner.borrow_mut().calls.push(call);
    }

    fn current_acl(&self) -> Result<Vec<AclInfo>, GuardianError<MockError>> {
        self.inner
            .borrow()
            .acl
            .clone()
            .ok_or_else(|| GuardianError::Internal(MockError("acl unavailable".into())))
    }
}

impl Guardian for MockGuardian {
    type Error = MockError;

    async fn can_admin(
        &self,
        _resource: &Resource,
        _user: &SignedInUser,
    ) -> Result<bool, GuardianError<Self::Error>> {
        self.record("can_admin");
        self.inner
            .borrow()
            .can_admin
            .ok_or_else(|| GuardianError::Internal(MockError("can_admin unavailable".into())))
    }

    async fn hidden_acl(
        &self,
        _resource: &Resource,
        _config: &Config,
    ) -> Result<Vec<PermissionEntry>, GuardianError<Self::Error>> {
        self.record("hidden_acl");
        self.inner
            .borrow()
            .hidden
            .clone()
            .ok_or_else(|| GuardianError::Internal(MockError("hidden acl unavailable".into())))
    }

    async fn check_permission_before_update(
        &self,
        _resource: &Resource,
        _user: &SignedInUser,
        _permission: PermissionLevel,
        entries: &[PermissionEntry],
    ) -> Result<bool, GuardianError<Self::Error>> {
        self.record("check_permission_before_update");
        let mut state = self.inner.borrow_mut();
        state.checked = entries.to_vec();
        match state.check {
            CheckOutcome::Allow => Ok(true),
            CheckOutcome::Deny => Ok(false),
            CheckOutcome::PermissionExists => Err(GuardianError::PermissionExists),
            CheckOutcome::Override => Err(GuardianError::Override),
            CheckOutcome::Fail => Err(GuardianError::Internal(MockError(
                "check unavailable".into(),
            ))),
        }
    }

    async fn acl(
        &self,
        _resource: &Resource,
        _user: &SignedInUser,
    ) -> Result<Vec<AclInfo>, GuardianError<Self::Error>> {
        self.record("acl");
        self.current_acl()
    }

    async fn acl_without_duplicates(
        &self,
        _resource: &Resource,
        _user: &SignedInUser,
    ) -> Result<Vec<AclInfo>, GuardianError<Self::Error>> {
        self.record("acl_without_duplicates");
        let acl = self.current_acl()?;

        // Inherited entries are shadowed by an entry for the same subject on the resource.
        let own: Vec<_> = acl
            .iter()
            .filter(|info| !info.inherited)
            .filter_map(AclInfo::subject)
            .collect();
        let deduplicated = acl
            .into_iter()
            .filter(|info| {
                !info.inherited
                    || info
                        .subject()
                        .is_none_or(|subject| !own.contains(&subject))
            })
            .collect();

        Ok(deduplicated)
    }
}
