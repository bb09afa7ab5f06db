use std::sync::Arc;

use authority_application::{
    AuthorityRepository, AuthorityService, AuthoritySeed, RolePermissionQuery, UserRoleQuery,
    install_global, resolve,
};
use authority_core::{AppError, NonEmptyString};
use authority_domain::{PermissionId, RoleId, UserId};

use super::InMemoryAuthorityRepository;

fn name(value: &str) -> NonEmptyString {
    NonEmptyString::new(value).unwrap_or_else(|_| unreachable!())
}

async fn service() -> AuthorityService {
    let repository = Arc::new(InMemoryAuthorityRepository::new());
    AuthorityService::initialize(repository)
        .await
        .unwrap_or_else(|_| unreachable!())
}

async fn service_with(permissions: &[&str], roles: &[&str]) -> AuthorityService {
    let service = service().await;
    for permission in permissions {
        assert!(service.create_permission(permission, "").await.is_ok());
    }
    for role in roles {
        assert!(service.create_role(role, "").await.is_ok());
    }
    service
}

async fn sorted_permissions(service: &AuthorityService, role_name: &str) -> Vec<String> {
    let mut permissions = service
        .get_permissions_by_role(role_name)
        .await
        .unwrap_or_default();
    permissions.sort();
    permissions
}

#[tokio::test]
async fn ids_follow_insertion_order_per_table() {
    let repository = InMemoryAuthorityRepository::new();

    let first = repository.insert_role(&name("b"), "").await;
    let second = repository.insert_role(&name("a"), "").await;
    let permission = repository.insert_permission(&name("read"), "").await;

    assert_eq!(first.map(|role| role.id()).ok(), Some(RoleId::new(1)));
    assert_eq!(second.map(|role| role.id()).ok(), Some(RoleId::new(2)));
    assert_eq!(
        permission.map(|permission| permission.id()).ok(),
        Some(PermissionId::new(1))
    );

    let names: Vec<String> = repository
        .list_roles()
        .await
        .unwrap_or_default()
        .iter()
        .map(|role| role.name().to_string())
        .collect();
    assert_eq!(names, vec!["b".to_owned(), "a".to_owned()]);
}

#[tokio::test]
async fn unique_names_and_grants_are_enforced() {
    let repository = InMemoryAuthorityRepository::new();
    let role = repository
        .insert_role(&name("admin"), "")
        .await
        .unwrap_or_else(|_| unreachable!());
    let permission = repository
        .insert_permission(&name("read"), "")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        repository.insert_role(&name("admin"), "").await,
        Err(AppError::Conflict(_))
    ));
    assert!(
        repository
            .insert_role_permission(role.id(), permission.id())
            .await
            .is_ok()
    );
    assert!(matches!(
        repository
            .insert_role_permission(role.id(), permission.id())
            .await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn references_to_missing_rows_are_rejected() {
    let repository = InMemoryAuthorityRepository::new();
    let role = repository
        .insert_role(&name("admin"), "")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        repository
            .insert_role_permission(role.id(), PermissionId::new(99))
            .await,
        Err(AppError::Storage(_))
    ));
    assert!(matches!(
        repository.insert_user_role(UserId::new(), RoleId::new(99)).await,
        Err(AppError::Storage(_))
    ));

    assert!(repository.insert_user_role(UserId::new(), role.id()).await.is_ok());
    assert!(matches!(
        repository.delete_role(role.id()).await,
        Err(AppError::Storage(_))
    ));
}

#[tokio::test]
async fn unfiltered_deletes_are_rejected() {
    let repository = InMemoryAuthorityRepository::new();

    assert!(matches!(
        repository
            .delete_role_permissions(RolePermissionQuery::default())
            .await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        repository.delete_user_roles(UserRoleQuery::default()).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn uncommitted_transaction_leaves_store_untouched() {
    let repository = InMemoryAuthorityRepository::new();
    let role = repository
        .insert_role(&name("admin"), "")
        .await
        .unwrap_or_else(|_| unreachable!());

    let mut transaction = repository.begin().await.unwrap_or_else(|_| unreachable!());
    assert!(transaction.delete_role(role.id()).await.is_ok());
    assert!(transaction.rollback().await.is_ok());

    {
        let mut dropped = repository.begin().await.unwrap_or_else(|_| unreachable!());
        assert!(dropped.delete_role(role.id()).await.is_ok());
    }

    assert!(matches!(
        repository.find_role_by_id(role.id()).await,
        Ok(Some(_))
    ));
}

#[tokio::test]
async fn committed_transaction_is_visible() {
    let repository = InMemoryAuthorityRepository::new();
    let role = repository
        .insert_role(&name("admin"), "")
        .await
        .unwrap_or_else(|_| unreachable!());

    let mut transaction = repository.begin().await.unwrap_or_else(|_| unreachable!());
    assert!(transaction.delete_role(role.id()).await.is_ok());
    assert!(transaction.commit().await.is_ok());

    assert!(matches!(repository.find_role_by_id(role.id()).await, Ok(None)));
}

#[tokio::test]
async fn create_role_twice_yields_one_record() {
    let service = service().await;

    assert!(service.create_role("admin", "").await.is_ok());
    assert!(service.create_role("admin", "").await.is_ok());

    let roles = service.get_roles_data().await.unwrap_or_default();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name().as_str(), "admin");
}

#[tokio::test]
async fn assign_permissions_to_unknown_role_creates_no_grant() {
    let service = service_with(&["read"], &[]).await;

    assert!(matches!(
        service.assign_permissions("ghost-role", &["read"]).await,
        Err(AppError::RoleNotFound(name)) if name == "ghost-role"
    ));
    assert!(matches!(
        service.delete_permission("read").await,
        Ok(())
    ));
}

#[tokio::test]
async fn assign_permissions_resolves_before_writing() {
    let service = service_with(&["read"], &["admin"]).await;

    assert!(matches!(
        service
            .assign_permissions("admin", &["read", "ghost-perm"])
            .await,
        Err(AppError::PermissionNotFound(name)) if name == "ghost-perm"
    ));
    assert!(sorted_permissions(&service, "admin").await.is_empty());
}

#[tokio::test]
async fn sync_assign_permissions_replaces_atomically() {
    let service = service_with(&["read", "write", "delete"], &["admin"]).await;
    assert!(service.assign_permissions("admin", &["read", "write"]).await.is_ok());

    assert!(
        service
            .sync_assign_permissions("admin", &["write", "delete"])
            .await
            .is_ok()
    );
    assert_eq!(
        sorted_permissions(&service, "admin").await,
        vec!["delete".to_owned(), "write".to_owned()]
    );
}

#[tokio::test]
async fn failed_sync_keeps_original_grants() {
    let service = service_with(&["read", "write"], &["admin"]).await;
    assert!(service.assign_permissions("admin", &["read", "write"]).await.is_ok());

    assert!(matches!(
        service
            .sync_assign_permissions("admin", &["write", "delete"])
            .await,
        Err(AppError::PermissionNotFound(name)) if name == "delete"
    ));
    assert_eq!(
        sorted_permissions(&service, "admin").await,
        vec!["read".to_owned(), "write".to_owned()]
    );
}

#[tokio::test]
async fn delete_role_waits_for_last_assignment() {
    let service = service_with(&[], &["admin"]).await;
    let user_id = UserId::new();
    assert!(service.assign_role(user_id, "admin").await.is_ok());

    assert!(matches!(
        service.delete_role("admin").await,
        Err(AppError::RoleInUse(_))
    ));

    assert!(service.revoke_role(user_id, "admin").await.is_ok());
    assert!(service.delete_role("admin").await.is_ok());
    assert!(service.get_roles().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn check_permission_resolves_through_any_held_role() {
    let service = service_with(&["publish"], &["author", "reader"]).await;
    let user_id = UserId::new();
    assert!(service.assign_permissions("author", &["publish"]).await.is_ok());
    assert!(service.assign_role(user_id, "author").await.is_ok());
    assert!(service.assign_role(user_id, "reader").await.is_ok());

    assert!(matches!(
        service.check_permission(user_id, "publish").await,
        Ok(true)
    ));

    let stranger = UserId::new();
    assert!(matches!(
        service.check_permission(stranger, "publish").await,
        Ok(false)
    ));
    assert!(matches!(
        service.check_permission(stranger, "ghost").await,
        Err(AppError::PermissionNotFound(_))
    ));
}

#[tokio::test]
async fn second_assignment_is_rejected() {
    let service = service_with(&[], &["admin"]).await;
    let user_id = UserId::new();

    assert!(service.assign_role(user_id, "admin").await.is_ok());
    assert!(matches!(
        service.assign_role(user_id, "admin").await,
        Err(AppError::RoleAlreadyAssigned(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_assignments_store_one_row() {
    let service = service_with(&[], &["admin"]).await;
    let user_id = UserId::new();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.assign_role(user_id, "admin").await
        }));
    }

    let mut assigned = 0;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => assigned += 1,
            Ok(Err(AppError::RoleAlreadyAssigned(_))) => {}
            Ok(Err(error)) => panic!("unexpected assignment error: {error}"),
            Err(error) => panic!("assignment task failed: {error}"),
        }
    }

    assert_eq!(assigned, 1);
    assert_eq!(
        service.get_user_roles(user_id).await.unwrap_or_default(),
        vec!["admin".to_owned()]
    );
}

#[tokio::test]
async fn rename_keeps_grants_attached() {
    let service = service_with(&["read"], &["viewer"]).await;
    let user_id = UserId::new();
    assert!(service.assign_permissions("viewer", &["read"]).await.is_ok());
    assert!(service.assign_role(user_id, "viewer").await.is_ok());
    let viewer = service
        .get_role("viewer")
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());

    assert!(service.update_role(viewer.id(), "reader", "").await.is_ok());

    assert_eq!(
        service.get_user_roles(user_id).await.unwrap_or_default(),
        vec!["reader".to_owned()]
    );
    assert!(matches!(
        service.check_role(user_id, "viewer").await,
        Err(AppError::RoleNotFound(_))
    ));
}

#[tokio::test]
async fn seed_is_idempotent() {
    let service = service().await;
    let seed = AuthoritySeed::from_json(
        r#"{
            "permissions": [
                {"name": "post.read"},
                {"name": "post.write", "description": "edit posts"}
            ],
            "roles": [
                {"name": "editor", "permissions": ["post.read", "post.write"]},
                {"name": "guest", "permissions": ["post.read"]}
            ],
            "assignments": [
                {"user_id": "7f1f4a52-4e7b-4a7e-9d7e-2f5c7b0d8a11", "roles": ["editor"]}
            ]
        }"#,
    )
    .unwrap_or_else(|_| unreachable!());

    let first = service.apply_seed(&seed).await.unwrap_or_default();
    let second = service.apply_seed(&seed).await.unwrap_or_default();

    assert_eq!(first.permissions, 2);
    assert_eq!(first.roles, 2);
    assert_eq!(first.assignments_created, 1);
    assert_eq!(second.assignments_created, 0);
    assert_eq!(second.assignments_existing, 1);
    assert_eq!(
        sorted_permissions(&service, "editor").await,
        vec!["post.read".to_owned(), "post.write".to_owned()]
    );
}

#[tokio::test]
async fn seed_with_unknown_permission_fails() {
    let service = service().await;
    let seed = AuthoritySeed::from_json(
        r#"{"roles": [{"name": "editor", "permissions": ["ghost"]}]}"#,
    )
    .unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        service.apply_seed(&seed).await,
        Err(AppError::PermissionNotFound(_))
    ));
}

#[tokio::test]
async fn seed_names_with_surrounding_spaces_are_trimmed() {
    let service = service().await;
    let seed = AuthoritySeed::from_json(
        r#"{
            "permissions": [{"name": " read "}],
            "roles": [{"name": "admin ", "permissions": ["read", " read"]}],
            "assignments": [
                {"user_id": "3b0c2f7e-1d4a-4c53-8f7a-6e2d9b1c0a44", "roles": [" admin"]}
            ]
        }"#,
    )
    .unwrap_or_else(|_| unreachable!());

    let report = service.apply_seed(&seed).await;

    assert!(report.is_ok());
    assert_eq!(report.unwrap_or_default().assignments_created, 1);
    assert_eq!(
        service.get_roles().await.unwrap_or_default(),
        vec!["admin".to_owned()]
    );
    assert_eq!(
        sorted_permissions(&service, "admin").await,
        vec!["read".to_owned()]
    );
}

#[tokio::test]
async fn process_wide_authority_installs_once() {
    assert!(install_global(service().await).is_ok());
    assert!(resolve().is_some());

    assert!(matches!(
        install_global(service().await),
        Err(AppError::Conflict(_))
    ));
}
