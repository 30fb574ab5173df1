// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.

mod guardian;
mod store;

pub use guardian::{CheckOutcome, MockGuardian};
pub use store::{AppliedBatch, LegacyOutcome, MemoryLegacyStore, MemoryPermissions};

use thiserror::Error;

use crate::config::Config;
use crate::entry::{AclInfo, BuiltinRole, SignedInUser};
use crate::permission::PermissionLevel;
use crate::service::Permissions;
use crate::traits::AvatarUrls;

#[derive(Debug, Error)]
#[error("mock failure: {0}")]
pub struct MockError(pub String);

/// Avatar URLs derived directly from the email.
#[derive(Clone, Debug, Default)]
pub struct TestAvatars;

impl AvatarUrls for TestAvatars {
    fn gravatar_url(&self, email: &str) -> String {
        format!("/avatar/{}", email)
    }

    fn gravatar_url_with_default(&self, email: &str, text: &str) -> String {
        if email.is_empty() {
            format!("/avatar/default/{}", text)
        } else {
            format!("/avatar/{}", email)
        }
    }
}

pub type TestPermissions =
    Permissions<MockGuardian, MemoryPermissions, MemoryPermissions, MemoryLegacyStore, TestAvatars>;

/// Handles to all collaborators of a test service, sharing state with the service.
#[derive(Debug)]
pub struct TestHarness {
    pub guardian: MockGuardian,
    pub dashboards: MemoryPermissions,
    pub folders: MemoryPermissions,
    pub legacy: MemoryLegacyStore,
    pub service: TestPermissions,
}

impl TestHarness {
    pub fn new(config: Config) -> Self {
        let guardian = MockGuardian::default();
        let dashboards = MemoryPermissions::default();
        let folders = MemoryPermissions::default();
        let legacy = MemoryLegacyStore::default();
        let service = Permissions::new(
            config,
            guardian.clone(),
            dashboards.clone(),
            folders.clone(),
            legacy.clone(),
            TestAvatars,
        );

        Self {
            guardian,
            dashboards,
            folders,
            legacy,
            service,
        }
    }
}

pub fn signed_in_user(user_id: i64, login: &str) -> SignedInUser {
    SignedInUser {
        user_id,
        org_id: 1,
        login: login.to_string(),
    }
}

pub fn user_info(user_id: i64, login: &str, permission: PermissionLevel) -> AclInfo {
    AclInfo {
        org_id: 1,
        user_id,
        user_login: login.to_string(),
        user_email: format!("{}@example.org", login),
        permission: Some(permission),
        permission_name: permission.to_string(),
        ..Default::default()
    }
}

pub fn team_info(team_id: i64, name: &str, permission: PermissionLevel) -> AclInfo {
    AclInfo {
        org_id: 1,
        team_id,
        team: name.to_string(),
        permission: Some(permission),
        permission_name: permission.to_string(),
        ..Default::default()
    }
}

pub fn role_info(role: &str, permission: PermissionLevel) -> AclInfo {
    AclInfo {
        org_id: 1,
        role: Some(BuiltinRole::from(role)),
        permission: Some(permission),
        permission_name: permission.to_string(),
        ..Default::default()
    }
}

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}
