use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use authority_application::{
    AuthorityRepository, AuthorityTransaction, RolePermissionQuery, UserRoleQuery,
};
use authority_core::{AppError, AppResult, NonEmptyString};
use authority_domain::{
    Permission, PermissionId, Role, RoleId, RolePermission, RolePermissionId, UserId, UserRole,
    UserRoleId,
};

mod state;
mod transaction;

#[cfg(test)]
mod tests;

use state::AuthorityState;
use transaction::InMemoryAuthorityTransaction;

/// In-memory authority store.
///
/// Enforces the same uniqueness and reference rules as the Postgres schema.
/// A transaction holds the store lock until it ends, so units of work run
/// one at a time.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuthorityRepository {
    state: Arc<Mutex<AuthorityState>>,
}

impl InMemoryAuthorityRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorityRepository for InMemoryAuthorityRepository {
    async fn ensure_schema(&self) -> AppResult<()> {
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn AuthorityTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(InMemoryAuthorityTransaction::new(guard)))
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self.state.lock().await.role_by_name(name).cloned())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.lock().await.roles.get(&role_id).cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.state.lock().await.roles.values().cloned().collect())
    }

    async fn insert_role(&self, name: &NonEmptyString, description: &str) -> AppResult<Role> {
        self.state.lock().await.insert_role(name, description)
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        self.state.lock().await.update_role(role)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.state.lock().await.delete_role(role_id)
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self.state.lock().await.permission_by_name(name).cloned())
    }

    async fn find_permission_by_id(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self.state.lock().await.permissions.get(&permission_id).cloned())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.state.lock().await.permissions.values().cloned().collect())
    }

    async fn insert_permission(
        &self,
        name: &NonEmptyString,
        description: &str,
    ) -> AppResult<Permission> {
        self.state.lock().await.insert_permission(name, description)
    }

    async fn update_permission(&self, permission: &Permission) -> AppResult<()> {
        self.state.lock().await.update_permission(permission)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.state.lock().await.delete_permission(permission_id)
    }

    async fn find_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Option<RolePermission>> {
        let query = RolePermissionQuery::for_role(role_id).with_permission(permission_id);
        Ok(self
            .state
            .lock()
            .await
            .role_permissions(&query)
            .into_iter()
            .next())
    }

    async fn list_role_permissions(
        &self,
        query: RolePermissionQuery,
    ) -> AppResult<Vec<RolePermission>> {
        Ok(self.state.lock().await.role_permissions(&query))
    }

    async fn insert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermission> {
        self.state
            .lock()
            .await
            .insert_role_permission(role_id, permission_id)
    }

    async fn delete_role_permissions(&self, query: RolePermissionQuery) -> AppResult<u64> {
        self.state.lock().await.delete_role_permissions(&query)
    }

    async fn find_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRole>> {
        Ok(self
            .state
            .lock()
            .await
            .user_roles(&UserRoleQuery::for_user(user_id).with_role(role_id))
            .into_iter()
            .next())
    }

    async fn list_user_roles(&self, query: UserRoleQuery) -> AppResult<Vec<UserRole>> {
        Ok(self.state.lock().await.user_roles(&query))
    }

    async fn insert_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<UserRole> {
        self.state.lock().await.insert_user_role(user_id, role_id)
    }

    async fn delete_user_roles(&self, query: UserRoleQuery) -> AppResult<u64> {
        self.state.lock().await.delete_user_roles(&query)
    }
}
