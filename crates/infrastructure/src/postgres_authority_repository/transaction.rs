use super::*;

/// Unit of work over one pooled connection.
///
/// Dropping it without [`AuthorityTransaction::commit`] rolls back, which is
/// the behavior of the wrapped [`Transaction`].
pub(super) struct PostgresAuthorityTransaction {
    transaction: Transaction<'static, Postgres>,
    tables: AuthorityTables,
}

impl PostgresAuthorityTransaction {
    pub(super) fn new(
        transaction: Transaction<'static, Postgres>,
        tables: AuthorityTables,
    ) -> Self {
        Self {
            transaction,
            tables,
        }
    }
}

#[async_trait]
impl AuthorityTransaction for PostgresAuthorityTransaction {
    async fn lock_role_by_name(&mut self, name: &str) -> AppResult<Option<Role>> {
        records::find_by_name(&mut *self.transaction, &self.tables.roles, name, true)
            .await?
            .map(NamedRow::into_role)
            .transpose()
    }

    async fn lock_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>> {
        records::find_by_name(&mut *self.transaction, &self.tables.permissions, name, true)
            .await?
            .map(NamedRow::into_permission)
            .transpose()
    }

    async fn find_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>> {
        records::find_by_name(&mut *self.transaction, &self.tables.permissions, name, false)
            .await?
            .map(NamedRow::into_permission)
            .transpose()
    }

    async fn list_user_roles(&mut self, query: UserRoleQuery) -> AppResult<Vec<UserRole>> {
        grants::list_user_roles(&mut *self.transaction, &self.tables, &query).await
    }

    async fn list_role_permissions(
        &mut self,
        query: RolePermissionQuery,
    ) -> AppResult<Vec<RolePermission>> {
        grants::list_role_permissions(&mut *self.transaction, &self.tables, &query).await
    }

    async fn insert_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermission> {
        grants::insert_role_permission(&mut *self.transaction, &self.tables, role_id, permission_id)
            .await
    }

    async fn delete_role_permissions(&mut self, query: RolePermissionQuery) -> AppResult<u64> {
        grants::delete_role_permissions(&mut *self.transaction, &self.tables, &query).await
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<()> {
        records::delete(&mut *self.transaction, &self.tables.roles, role_id.as_i64()).await
    }

    async fn delete_permission(&mut self, permission_id: PermissionId) -> AppResult<()> {
        records::delete(
            &mut *self.transaction,
            &self.tables.permissions,
            permission_id.as_i64(),
        )
        .await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Storage(format!("failed to commit transaction: {error}"))
        })
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.transaction.rollback().await.map_err(|error| {
            AppError::Storage(format!("failed to roll back transaction: {error}"))
        })
    }
}
