// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_matches::assert_matches;

use crate::command::SetResourcePermissionCommand;
use crate::config::{AccessControlMode, Config};
use crate::entry::{AclItem, BuiltinRole, PermissionEntry, Resource};
use crate::permission::PermissionLevel;
use crate::test_utils::{
    CheckOutcome, LegacyOutcome, TestHarness, role_info, setup_logging, signed_in_user,
    team_info, user_info,
};
use crate::validate::ValidationError;

use super::{ConflictReason, DenyReason, DependencyError, ListError, UpdateError};

fn dashboard() -> Resource {
    Resource::dashboard(1, 10, "dash-uid")
}

fn folder() -> Resource {
    Resource::folder(1, 20, "folder-uid")
}

fn grant(user_id: i64, team_id: i64, role: &str, permission: &str) -> SetResourcePermissionCommand {
    SetResourcePermissionCommand {
        user_id,
        team_id,
        builtin_role: role.to_string(),
        permission: permission.to_string(),
    }
}

fn revoke(user_id: i64, team_id: i64, role: &str) -> SetResourcePermissionCommand {
    grant(user_id, team_id, role, "")
}

fn hidden_entry(user_id: i64) -> PermissionEntry {
    PermissionEntry {
        org_id: 1,
        dashboard_id: 10,
        user_id,
        team_id: 0,
        role: None,
        permission: PermissionLevel::Admin,
        created: 0,
        updated: 0,
    }
}

#[tokio::test]
async fn resubmitting_current_list_only_regrants() {
    setup_logging();

    let harness = TestHarness::new(Config::default());
    harness.guardian.set_acl(vec![
        user_info(1, "alice", PermissionLevel::Admin),
        team_info(2, "ops", PermissionLevel::Edit),
        role_info("Viewer", PermissionLevel::View),
    ]);

    let items = vec![
        AclItem::user(1, PermissionLevel::Admin),
        AclItem::team(2, PermissionLevel::Edit),
        AclItem::role(BuiltinRole::viewer(), PermissionLevel::View),
    ];
    harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &items)
        .await
        .unwrap();

    assert_eq!(
        harness.dashboards.single_batch(),
        vec![
            grant(1, 0, "", "Admin"),
            grant(0, 2, "", "Edit"),
            grant(0, 0, "Viewer", "View"),
        ]
    );
    assert!(harness.folders.batches().is_empty());
}

#[tokio::test]
async fn omitted_permissions_are_removed() {
    let harness = TestHarness::new(Config::default());
    harness.guardian.set_acl(vec![
        user_info(1, "alice", PermissionLevel::Admin),
        user_info(3, "bob", PermissionLevel::View),
    ]);

    harness
        .service
        .update(
            &dashboard(),
            &signed_in_user(1, "alice"),
            &[AclItem::user(1, PermissionLevel::Admin)],
        )
        .await
        .unwrap();

    let commands = harness.dashboards.single_batch();
    let revokes: Vec<_> = commands.iter().filter(|c| c.is_revoke()).collect();
    assert_eq!(revokes, vec![&revoke(3, 0, "")]);
}

#[tokio::test]
async fn roles_are_replaced_not_matched_by_kind() {
    let harness = TestHarness::new(Config::default());
    harness
        .guardian
        .set_acl(vec![role_info("Editor", PermissionLevel::Edit)]);

    harness
        .service
        .update(
            &dashboard(),
            &signed_in_user(1, "alice"),
            &[AclItem::role(BuiltinRole::viewer(), PermissionLevel::View)],
        )
        .await
        .unwrap();

    assert_eq!(
        harness.dashboards.single_batch(),
        vec![grant(0, 0, "Viewer", "View"), revoke(0, 0, "Editor")]
    );
}

#[tokio::test]
async fn invalid_items_are_rejected_before_any_call() {
    let harness = TestHarness::new(Config::default());

    let user_and_team = AclItem {
        user_id: 5,
        team_id: 7,
        role: None,
        permission: PermissionLevel::View,
    };
    let result = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[user_and_team])
        .await;
    assert_matches!(
        result,
        Err(UpdateError::Validation(ValidationError::ConflictingSubject))
    );

    let user_and_role = AclItem {
        user_id: 5,
        team_id: 0,
        role: Some(BuiltinRole::admin()),
        permission: PermissionLevel::Admin,
    };
    let result = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[user_and_role])
        .await;
    let err = result.unwrap_err();
    assert_matches!(
        err,
        UpdateError::Validation(ValidationError::InvalidSubjectCombination)
    );
    assert_eq!(err.status_code(), 400);

    assert!(harness.guardian.calls().is_empty());
    assert!(harness.dashboards.batches().is_empty());
}

#[tokio::test]
async fn hidden_entries_survive_omission() {
    let harness = TestHarness::new(Config::default());
    harness.guardian.set_hidden(vec![hidden_entry(1)]);
    harness.guardian.set_acl(vec![
        user_info(1, "service", PermissionLevel::Admin),
        user_info(2, "bob", PermissionLevel::Edit),
    ]);

    harness
        .service
        .update(&dashboard(), &signed_in_user(9, "admin"), &[])
        .await
        .unwrap();

    assert_eq!(
        harness.dashboards.single_batch(),
        vec![grant(1, 0, "", "Admin"), revoke(2, 0, "")]
    );

    // The safety check saw the hidden entry as part of the desired list.
    assert_eq!(harness.guardian.checked_entries(), vec![hidden_entry(1)]);
}

#[tokio::test]
async fn first_permissions_of_a_resource() {
    let harness = TestHarness::new(Config::default());

    harness
        .service
        .update(
            &dashboard(),
            &signed_in_user(1, "alice"),
            &[AclItem::team(9, PermissionLevel::Edit)],
        )
        .await
        .unwrap();

    assert_eq!(
        harness.dashboards.single_batch(),
        vec![grant(0, 9, "", "Edit")]
    );
}

#[tokio::test]
async fn folders_use_folder_permissions() {
    let harness = TestHarness::new(Config::default());

    harness
        .service
        .update(
            &folder(),
            &signed_in_user(1, "alice"),
            &[AclItem::user(4, PermissionLevel::View)],
        )
        .await
        .unwrap();

    assert!(harness.dashboards.batches().is_empty());
    let batches = harness.folders.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].org_id, 1);
    assert_eq!(batches[0].uid, "folder-uid");
    assert_eq!(batches[0].commands, vec![grant(4, 0, "", "View")]);
}

#[tokio::test]
async fn guardian_is_consulted_in_order() {
    let harness = TestHarness::new(Config::default());

    harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[])
        .await
        .unwrap();

    assert_eq!(
        harness.guardian.calls(),
        vec![
            "can_admin",
            "hidden_acl",
            "check_permission_before_update",
            "acl"
        ]
    );
}

#[tokio::test]
async fn non_admins_are_denied() {
    let harness = TestHarness::new(Config::default());
    harness.guardian.set_can_admin(false);

    let err = harness
        .service
        .update(
            &dashboard(),
            &signed_in_user(3, "bob"),
            &[AclItem::user(3, PermissionLevel::Admin)],
        )
        .await
        .unwrap_err();

    assert_matches!(err, UpdateError::AuthorizationDenied(DenyReason::NotAdmin));
    assert_eq!(err.status_code(), 403);
    assert_eq!(harness.guardian.calls(), vec!["can_admin"]);
    assert!(harness.dashboards.batches().is_empty());
}

#[tokio::test]
async fn failing_admin_check_is_internal() {
    let harness = TestHarness::new(Config::default());
    harness.guardian.fail_can_admin();

    let err = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[])
        .await
        .unwrap_err();

    assert_matches!(err, UpdateError::Dependency(DependencyError::CanAdmin(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn removing_own_admin_is_forbidden() {
    let harness = TestHarness::new(Config::default());
    harness.guardian.set_check(CheckOutcome::Deny);

    let err = harness
        .service
        .update(
            &folder(),
            &signed_in_user(1, "alice"),
            &[AclItem::user(1, PermissionLevel::View)],
        )
        .await
        .unwrap_err();

    assert_matches!(
        err,
        UpdateError::AuthorizationDenied(DenyReason::CannotRemoveOwnAdmin)
    );
    assert_eq!(err.status_code(), 403);
    assert_eq!(
        err.to_string(),
        "Cannot remove own admin permission for a folder"
    );
    assert!(harness.folders.batches().is_empty());
}

#[tokio::test]
async fn guardian_conflicts_are_bad_requests() {
    let harness = TestHarness::new(Config::default());

    harness.guardian.set_check(CheckOutcome::PermissionExists);
    let err = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[])
        .await
        .unwrap_err();
    assert_matches!(err, UpdateError::Conflict(ConflictReason::PermissionExists));
    assert_eq!(err.status_code(), 400);

    harness.guardian.set_check(CheckOutcome::Override);
    let err = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[])
        .await
        .unwrap_err();
    assert_matches!(err, UpdateError::Conflict(ConflictReason::Override));
    assert_eq!(err.status_code(), 400);

    harness.guardian.set_check(CheckOutcome::Fail);
    let err = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[])
        .await
        .unwrap_err();
    assert_matches!(
        err,
        UpdateError::Dependency(DependencyError::CheckPermission(_))
    );
    assert_eq!(err.status_code(), 500);

    assert!(harness.dashboards.batches().is_empty());
}

#[tokio::test]
async fn failing_acl_fetch_applies_nothing() {
    let harness = TestHarness::new(Config::default());
    harness.guardian.fail_acl();

    let err = harness
        .service
        .update(
            &dashboard(),
            &signed_in_user(1, "alice"),
            &[AclItem::user(1, PermissionLevel::Admin)],
        )
        .await
        .unwrap_err();

    assert_matches!(err, UpdateError::Dependency(DependencyError::FetchAcl(_)));
    assert!(harness.dashboards.batches().is_empty());
}

#[tokio::test]
async fn failing_hidden_acl_applies_nothing() {
    let harness = TestHarness::new(Config::default());
    harness.guardian.fail_hidden();

    let err = harness
        .service
        .update(
            &dashboard(),
            &signed_in_user(1, "alice"),
            &[AclItem::user(1, PermissionLevel::Admin)],
        )
        .await
        .unwrap_err();

    assert_matches!(err, UpdateError::Dependency(DependencyError::HiddenAcl(_)));
    assert_eq!(err.status_code(), 500);
    assert_eq!(harness.guardian.calls(), vec!["can_admin", "hidden_acl"]);
    assert!(harness.dashboards.batches().is_empty());
    assert!(harness.folders.batches().is_empty());
    assert!(harness.legacy.updates().is_empty());
}

#[tokio::test]
async fn failing_permission_store_is_reported() {
    let harness = TestHarness::new(Config::default());
    harness.dashboards.fail();

    let err = harness
        .service
        .update(
            &dashboard(),
            &signed_in_user(1, "alice"),
            &[AclItem::user(1, PermissionLevel::Admin)],
        )
        .await
        .unwrap_err();

    assert_matches!(
        err,
        UpdateError::Dependency(DependencyError::ApplyCommands(_))
    );
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn legacy_mode_replaces_whole_list() {
    let harness = TestHarness::new(Config::new(AccessControlMode::Legacy));
    harness.guardian.set_hidden(vec![hidden_entry(1)]);
    harness
        .guardian
        .set_acl(vec![user_info(2, "bob", PermissionLevel::Edit)]);

    harness
        .service
        .update(
            &dashboard(),
            &signed_in_user(1, "alice"),
            &[AclItem::team(5, PermissionLevel::View)],
        )
        .await
        .unwrap();

    let updates = harness.legacy.updates();
    assert_eq!(updates.len(), 1);
    let (dashboard_id, entries) = &updates[0];
    assert_eq!(*dashboard_id, 10);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].team_id, 5);
    assert_eq!(entries[0].dashboard_id, 10);
    assert_eq!(entries[1], hidden_entry(1));

    // The current list is never read and the resource stores stay untouched.
    assert!(!harness.guardian.calls().contains(&"acl"));
    assert!(harness.dashboards.batches().is_empty());
    assert!(harness.folders.batches().is_empty());
}

#[tokio::test]
async fn legacy_store_conflicts() {
    let harness = TestHarness::new(Config::new(AccessControlMode::Legacy));

    harness.legacy.set_outcome(LegacyOutcome::AclInfoMissing);
    let err = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[])
        .await
        .unwrap_err();
    assert_matches!(err, UpdateError::Conflict(ConflictReason::AclInfoMissing));
    assert_eq!(err.status_code(), 409);

    harness.legacy.set_outcome(LegacyOutcome::DashboardEmpty);
    let err = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[])
        .await
        .unwrap_err();
    assert_matches!(err, UpdateError::Conflict(ConflictReason::DashboardEmpty));
    assert_eq!(err.status_code(), 409);

    harness.legacy.set_outcome(LegacyOutcome::Fail);
    let err = harness
        .service
        .update(&dashboard(), &signed_in_user(1, "alice"), &[])
        .await
        .unwrap_err();
    assert_matches!(err, UpdateError::Dependency(DependencyError::LegacyUpdate(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn list_hides_hidden_users() {
    let config = Config::default().with_hidden_users(["service"]);
    let harness = TestHarness::new(config);
    harness.guardian.set_acl(vec![
        user_info(1, "alice", PermissionLevel::Admin),
        user_info(2, "service", PermissionLevel::Admin),
        team_info(3, "ops", PermissionLevel::Edit),
    ]);

    let acl = harness
        .service
        .list(&dashboard(), &signed_in_user(1, "alice"))
        .await
        .unwrap();
    let logins: Vec<_> = acl.iter().map(|info| info.user_login.as_str()).collect();
    assert_eq!(logins, vec!["alice", ""]);

    // Hidden users see their own entry.
    let acl = harness
        .service
        .list(&dashboard(), &signed_in_user(2, "service"))
        .await
        .unwrap();
    assert_eq!(acl.len(), 3);
}

#[tokio::test]
async fn list_decorates_entries() {
    let harness = TestHarness::new(Config::default());

    let mut inherited = team_info(3, "ops", PermissionLevel::View);
    inherited.inherited = true;
    inherited.is_folder = true;
    inherited.uid = "folder-uid".into();
    inherited.slug = "my-folder".into();

    harness.guardian.set_acl(vec![
        user_info(1, "alice", PermissionLevel::Admin),
        inherited,
    ]);

    let acl = harness
        .service
        .list(&dashboard(), &signed_in_user(1, "alice"))
        .await
        .unwrap();

    assert_eq!(acl[0].user_avatar_url, "/avatar/alice@example.org");
    assert_eq!(acl[0].team_avatar_url, "");
    assert_eq!(acl[0].url, "");

    assert_eq!(acl[1].team_avatar_url, "/avatar/default/ops");
    assert_eq!(acl[1].url, "/dashboards/f/folder-uid/my-folder");
}

#[tokio::test]
async fn list_drops_shadowed_inherited_entries() {
    let harness = TestHarness::new(Config::default());

    let mut inherited = user_info(4, "carol", PermissionLevel::View);
    inherited.inherited = true;
    harness.guardian.set_acl(vec![
        inherited,
        user_info(4, "carol", PermissionLevel::Edit),
    ]);

    let acl = harness
        .service
        .list(&dashboard(), &signed_in_user(1, "alice"))
        .await
        .unwrap();

    assert_eq!(acl.len(), 1);
    assert_eq!(acl[0].permission, Some(PermissionLevel::Edit));
    assert_eq!(harness.guardian.calls(), vec!["can_admin", "acl_without_duplicates"]);
}

#[tokio::test]
async fn list_requires_admin() {
    let harness = TestHarness::new(Config::default());
    harness.guardian.set_can_admin(false);

    let err = harness
        .service
        .list(&dashboard(), &signed_in_user(3, "bob"))
        .await
        .unwrap_err();
    assert_matches!(err, ListError::AuthorizationDenied(DenyReason::NotAdmin));
    assert_eq!(err.status_code(), 403);

    harness.guardian.set_can_admin(true);
    harness.guardian.fail_acl();
    let err = harness
        .service
        .list(&dashboard(), &signed_in_user(1, "alice"))
        .await
        .unwrap_err();
    assert_matches!(err, ListError::Dependency(DependencyError::FetchAcl(_)));
    assert_eq!(err.status_code(), 500);
}
