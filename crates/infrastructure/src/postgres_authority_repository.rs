use async_trait::async_trait;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};

use authority_application::{
    AuthorityRepository, AuthorityTransaction, RolePermissionQuery, UserRoleQuery,
};
use authority_core::{AppError, AppResult, NonEmptyString, TablePrefix};
use authority_domain::{
    Permission, PermissionId, Role, RoleId, RolePermission, RolePermissionId, UserId, UserRole,
    UserRoleId,
};

mod grants;
mod records;
mod schema;
mod transaction;

#[cfg(test)]
mod tests;

use transaction::PostgresAuthorityTransaction;

/// PostgreSQL-backed authority store.
///
/// Table names carry the configured [`TablePrefix`]; the prefix is validated
/// on construction and therefore safe to splice into SQL text.
#[derive(Clone)]
pub struct PostgresAuthorityRepository {
    pool: PgPool,
    tables: AuthorityTables,
}

impl PostgresAuthorityRepository {
    /// Creates a repository with the provided connection pool and table prefix.
    #[must_use]
    pub fn new(pool: PgPool, prefix: TablePrefix) -> Self {
        Self {
            pool,
            tables: AuthorityTables::new(&prefix),
        }
    }
}

/// Fully prefixed table names.
#[derive(Debug, Clone)]
struct AuthorityTables {
    prefix: String,
    roles: String,
    permissions: String,
    role_permissions: String,
    user_roles: String,
}

impl AuthorityTables {
    fn new(prefix: &TablePrefix) -> Self {
        Self {
            prefix: prefix.as_str().to_owned(),
            roles: prefix.apply("roles"),
            permissions: prefix.apply("permissions"),
            role_permissions: prefix.apply("role_permissions"),
            user_roles: prefix.apply("user_roles"),
        }
    }
}

#[derive(Debug, FromRow)]
struct NamedRow {
    id: i64,
    name: String,
    description: String,
}

impl NamedRow {
    fn into_role(self) -> AppResult<Role> {
        Role::new(RoleId::new(self.id), self.name, self.description)
    }

    fn into_permission(self) -> AppResult<Permission> {
        Permission::new(PermissionId::new(self.id), self.name, self.description)
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    id: i64,
    role_id: i64,
    permission_id: i64,
}

impl From<RolePermissionRow> for RolePermission {
    fn from(row: RolePermissionRow) -> Self {
        Self::new(
            RolePermissionId::new(row.id),
            RoleId::new(row.role_id),
            PermissionId::new(row.permission_id),
        )
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    id: i64,
    user_id: uuid::Uuid,
    role_id: i64,
}

impl From<UserRoleRow> for UserRole {
    fn from(row: UserRoleRow) -> Self {
        Self::new(
            UserRoleId::new(row.id),
            UserId::from_uuid(row.user_id),
            RoleId::new(row.role_id),
        )
    }
}

#[async_trait]
impl AuthorityRepository for PostgresAuthorityRepository {
    async fn ensure_schema(&self) -> AppResult<()> {
        self.ensure_schema_impl().await
    }

    async fn begin(&self) -> AppResult<Box<dyn AuthorityTransaction>> {
        let transaction = self.pool.begin().await.map_err(|error| {
            AppError::Storage(format!("failed to begin transaction: {error}"))
        })?;

        Ok(Box::new(PostgresAuthorityTransaction::new(
            transaction,
            self.tables.clone(),
        )))
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        records::find_by_name(&self.pool, &self.tables.roles, name, false)
            .await?
            .map(NamedRow::into_role)
            .transpose()
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        records::find_by_id(&self.pool, &self.tables.roles, role_id.as_i64())
            .await?
            .map(NamedRow::into_role)
            .transpose()
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        records::list(&self.pool, &self.tables.roles)
            .await?
            .into_iter()
            .map(NamedRow::into_role)
            .collect()
    }

    async fn insert_role(&self, name: &NonEmptyString, description: &str) -> AppResult<Role> {
        records::insert(&self.pool, &self.tables.roles, name.as_str(), description)
            .await?
            .into_role()
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        records::update(
            &self.pool,
            &self.tables.roles,
            role.id().as_i64(),
            role.name().as_str(),
            role.description(),
        )
        .await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        records::delete(&self.pool, &self.tables.roles, role_id.as_i64()).await
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        records::find_by_name(&self.pool, &self.tables.permissions, name, false)
            .await?
            .map(NamedRow::into_permission)
            .transpose()
    }

    async fn find_permission_by_id(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        records::find_by_id(&self.pool, &self.tables.permissions, permission_id.as_i64())
            .await?
            .map(NamedRow::into_permission)
            .transpose()
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        records::list(&self.pool, &self.tables.permissions)
            .await?
            .into_iter()
            .map(NamedRow::into_permission)
            .collect()
    }

    async fn insert_permission(
        &self,
        name: &NonEmptyString,
        description: &str,
    ) -> AppResult<Permission> {
        records::insert(&self.pool, &self.tables.permissions, name.as_str(), description)
            .await?
            .into_permission()
    }

    async fn update_permission(&self, permission: &Permission) -> AppResult<()> {
        records::update(
            &self.pool,
            &self.tables.permissions,
            permission.id().as_i64(),
            permission.name().as_str(),
            permission.description(),
        )
        .await
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        records::delete(&self.pool, &self.tables.permissions, permission_id.as_i64()).await
    }

    async fn find_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Option<RolePermission>> {
        Ok(grants::list_role_permissions(
            &self.pool,
            &self.tables,
            &RolePermissionQuery::for_role(role_id)
                .with_permission(permission_id)
                .limit(1),
        )
        .await?
        .into_iter()
        .next())
    }

    async fn list_role_permissions(
        &self,
        query: RolePermissionQuery,
    ) -> AppResult<Vec<RolePermission>> {
        grants::list_role_permissions(&self.pool, &self.tables, &query).await
    }

    async fn insert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermission> {
        grants::insert_role_permission(&self.pool, &self.tables, role_id, permission_id).await
    }

    async fn delete_role_permissions(&self, query: RolePermissionQuery) -> AppResult<u64> {
        grants::delete_role_permissions(&self.pool, &self.tables, &query).await
    }

    async fn find_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRole>> {
        Ok(grants::list_user_roles(
            &self.pool,
            &self.tables,
            &UserRoleQuery::for_user(user_id).with_role(role_id).limit(1),
        )
        .await?
        .into_iter()
        .next())
    }

    async fn list_user_roles(&self, query: UserRoleQuery) -> AppResult<Vec<UserRole>> {
        grants::list_user_roles(&self.pool, &self.tables, &query).await
    }

    async fn insert_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<UserRole> {
        grants::insert_user_role(&self.pool, &self.tables, user_id, role_id).await
    }

    async fn delete_user_roles(&self, query: UserRoleQuery) -> AppResult<u64> {
        grants::delete_user_roles(&self.pool, &self.tables, &query).await
    }
}

/// Maps a unique violation to [`AppError::Conflict`] and anything else to storage.
fn map_unique_violation(error: sqlx::Error, action: &str, subject: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("{subject} already exists"));
    }

    AppError::Storage(format!("failed to {action}: {error}"))
}

fn query_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|limit| i64::try_from(limit).unwrap_or(i64::MAX))
}
