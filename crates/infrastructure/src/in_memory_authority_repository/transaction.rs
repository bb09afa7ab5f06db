use super::*;

/// Exclusive unit of work over the in-memory store.
///
/// Writes go to a working copy that replaces the shared state on commit.
pub(super) struct InMemoryAuthorityTransaction {
    guard: OwnedMutexGuard<AuthorityState>,
    working: AuthorityState,
}

impl InMemoryAuthorityTransaction {
    pub(super) fn new(guard: OwnedMutexGuard<AuthorityState>) -> Self {
        let working = (*guard).clone();
        Self { guard, working }
    }
}

#[async_trait]
impl AuthorityTransaction for InMemoryAuthorityTransaction {
    async fn lock_role_by_name(&mut self, name: &str) -> AppResult<Option<Role>> {
        Ok(self.working.role_by_name(name).cloned())
    }

    async fn lock_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self.working.permission_by_name(name).cloned())
    }

    async fn find_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self.working.permission_by_name(name).cloned())
    }

    async fn list_user_roles(&mut self, query: UserRoleQuery) -> AppResult<Vec<UserRole>> {
        Ok(self.working.user_roles(&query))
    }

    async fn list_role_permissions(
        &mut self,
        query: RolePermissionQuery,
    ) -> AppResult<Vec<RolePermission>> {
        Ok(self.working.role_permissions(&query))
    }

    async fn insert_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermission> {
        self.working.insert_role_permission(role_id, permission_id)
    }

    async fn delete_role_permissions(&mut self, query: RolePermissionQuery) -> AppResult<u64> {
        self.working.delete_role_permissions(&query)
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<()> {
        self.working.delete_role(role_id)
    }

    async fn delete_permission(&mut self, permission_id: PermissionId) -> AppResult<()> {
        self.working.delete_permission(permission_id)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
