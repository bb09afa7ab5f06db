use std::sync::Arc;

use authority_application::{
    AuthorityRepository, AuthorityService, RolePermissionQuery, UserRoleQuery,
};
use authority_core::table_prefix::TABLE_PREFIX_MAX_LENGTH;
use authority_core::{AppError, NonEmptyString, TablePrefix};
use authority_domain::{PermissionId, RoleId, UserId};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{AuthorityTables, PostgresAuthorityRepository};

const POSTGRES_IDENTIFIER_MAX_BYTES: usize = 63;

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => Some(pool),
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    }
}

/// Builds a repository over freshly created tables unique to the calling test.
async fn test_repository() -> Option<PostgresAuthorityRepository> {
    let pool = test_pool().await?;
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let prefix = TablePrefix::new(format!("t{}_", &suffix[..12]))
        .unwrap_or_else(|_| unreachable!());

    let repository = PostgresAuthorityRepository::new(pool, prefix);
    if let Err(error) = repository.ensure_schema().await {
        panic!("failed to create authority tables for postgres tests: {error}");
    }

    Some(repository)
}

fn name(value: &str) -> NonEmptyString {
    NonEmptyString::new(value).unwrap_or_else(|_| unreachable!())
}

#[test]
fn index_names_fit_identifier_limit_at_max_prefix() {
    let prefix = TablePrefix::new("p".repeat(TABLE_PREFIX_MAX_LENGTH))
        .unwrap_or_else(|_| unreachable!());
    let tables = AuthorityTables::new(&prefix);

    let index_names: Vec<String> = tables
        .schema_statements()
        .iter()
        .filter_map(|statement| {
            statement
                .split("CREATE INDEX IF NOT EXISTS")
                .nth(1)
                .and_then(|rest| rest.split_whitespace().next())
                .map(str::to_owned)
        })
        .collect();

    assert_eq!(index_names.len(), 2);
    for index_name in index_names {
        assert!(
            index_name.len() <= POSTGRES_IDENTIFIER_MAX_BYTES,
            "{index_name} would be truncated"
        );
    }
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let Some(repository) = test_repository().await else {
        return;
    };

    assert!(repository.ensure_schema().await.is_ok());
    assert!(repository.ensure_schema().await.is_ok());
}

#[tokio::test]
async fn roles_are_listed_in_id_order() {
    let Some(repository) = test_repository().await else {
        return;
    };

    for role in ["zeta", "alpha", "mid"] {
        assert!(repository.insert_role(&name(role), "").await.is_ok());
    }

    let roles = repository.list_roles().await.unwrap_or_default();
    let names: Vec<&str> = roles.iter().map(|role| role.name().as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[tokio::test]
async fn duplicate_names_surface_as_conflict() {
    let Some(repository) = test_repository().await else {
        return;
    };

    assert!(repository.insert_permission(&name("read"), "").await.is_ok());
    let duplicate = repository.insert_permission(&name("read"), "again").await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn duplicate_grants_surface_as_conflict() {
    let Some(repository) = test_repository().await else {
        return;
    };

    let role = repository
        .insert_role(&name("editor"), "")
        .await
        .unwrap_or_else(|_| unreachable!());
    let permission = repository
        .insert_permission(&name("write"), "")
        .await
        .unwrap_or_else(|_| unreachable!());

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

    let user_id = UserId::new();
    assert!(repository.insert_user_role(user_id, role.id()).await.is_ok());
    assert!(matches!(
        repository.insert_user_role(user_id, role.id()).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn grants_to_missing_rows_are_storage_errors() {
    let Some(repository) = test_repository().await else {
        return;
    };

    let grant = repository
        .insert_role_permission(RoleId::new(404), PermissionId::new(404))
        .await;

    assert!(matches!(grant, Err(AppError::Storage(_))));
}

#[tokio::test]
async fn unfiltered_deletes_are_rejected() {
    let Some(repository) = test_repository().await else {
        return;
    };

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
async fn grant_queries_filter_by_role_set_and_limit() {
    let Some(repository) = test_repository().await else {
        return;
    };

    let viewer = repository
        .insert_role(&name("viewer"), "")
        .await
        .unwrap_or_else(|_| unreachable!());
    let editor = repository
        .insert_role(&name("editor"), "")
        .await
        .unwrap_or_else(|_| unreachable!());
    let read = repository
        .insert_permission(&name("read"), "")
        .await
        .unwrap_or_else(|_| unreachable!());

    for role_id in [viewer.id(), editor.id()] {
        assert!(repository.insert_role_permission(role_id, read.id()).await.is_ok());
    }

    let both = repository
        .list_role_permissions(RolePermissionQuery::for_roles(vec![viewer.id(), editor.id()]))
        .await
        .unwrap_or_default();
    let limited = repository
        .list_role_permissions(RolePermissionQuery::for_permission(read.id()).limit(1))
        .await
        .unwrap_or_default();
    let none = repository
        .list_role_permissions(RolePermissionQuery::for_roles(Vec::new()))
        .await
        .unwrap_or_default();

    assert_eq!(both.len(), 2);
    assert_eq!(limited.len(), 1);
    assert!(none.is_empty());
}

#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let Some(repository) = test_repository().await else {
        return;
    };

    let role = repository
        .insert_role(&name("editor"), "")
        .await
        .unwrap_or_else(|_| unreachable!());

    {
        let mut transaction = repository.begin().await.unwrap_or_else(|_| unreachable!());
        assert!(transaction.delete_role(role.id()).await.is_ok());
    }

    let stored = repository.find_role_by_id(role.id()).await;
    assert!(matches!(stored, Ok(Some(_))));
}

#[tokio::test]
async fn service_round_trip_over_postgres() {
    let Some(repository) = test_repository().await else {
        return;
    };

    let service = AuthorityService::new(Arc::new(repository));
    let user_id = UserId::new();

    assert!(service.create_permission("post.read", "").await.is_ok());
    assert!(service.create_permission("post.write", "").await.is_ok());
    assert!(service.create_role("editor", "").await.is_ok());
    assert!(
        service
            .assign_permissions("editor", &["post.read", "post.write"])
            .await
            .is_ok()
    );
    assert!(service.assign_role(user_id, "editor").await.is_ok());

    assert!(
        service
            .check_permission(user_id, "post.write")
            .await
            .unwrap_or(false)
    );
    assert!(matches!(
        service.delete_role("editor").await,
        Err(AppError::RoleInUse(_))
    ));

    assert!(service.revoke_role(user_id, "editor").await.is_ok());
    assert!(service.delete_role("editor").await.is_ok());
    assert!(service.delete_permission("post.read").await.is_ok());
}

#[tokio::test]
async fn sync_assign_permissions_is_atomic_over_postgres() {
    let Some(repository) = test_repository().await else {
        return;
    };

    let service = AuthorityService::new(Arc::new(repository));
    assert!(service.create_permission("read", "").await.is_ok());
    assert!(service.create_permission("write", "").await.is_ok());
    assert!(service.create_role("editor", "").await.is_ok());
    assert!(service.assign_permissions("editor", &["read"]).await.is_ok());

    assert!(matches!(
        service.sync_assign_permissions("editor", &["write", "ghost"]).await,
        Err(AppError::PermissionNotFound(_))
    ));
    assert_eq!(
        service.get_permissions_by_role("editor").await.unwrap_or_default(),
        vec!["read".to_owned()]
    );

    assert!(
        service
            .sync_assign_permissions("editor", &["write", "write"])
            .await
            .is_ok()
    );
    assert_eq!(
        service.get_permissions_by_role("editor").await.unwrap_or_default(),
        vec!["write".to_owned()]
    );
}
