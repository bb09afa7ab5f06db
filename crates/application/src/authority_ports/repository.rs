use async_trait::async_trait;

use authority_core::{AppResult, NonEmptyString};
use authority_domain::{
    Permission, PermissionId, Role, RoleId, RolePermission, UserId, UserRole,
};

use super::queries::{RolePermissionQuery, UserRoleQuery};

/// Entity store port for roles, permissions and their grants.
///
/// Lookups return `Ok(None)` for missing records; every `Err` is a storage
/// failure or, for inserts and updates, a uniqueness `Conflict`.
#[async_trait]
pub trait AuthorityRepository: Send + Sync {
    /// Creates the four authority tables when they are missing.
    async fn ensure_schema(&self) -> AppResult<()>;

    /// Opens a unit of work. Dropping it without commit rolls back.
    async fn begin(&self) -> AppResult<Box<dyn AuthorityTransaction>>;

    /// Finds a role by unique name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Finds a role by surrogate key.
    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Lists all roles in storage scan order.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Inserts a role and returns the stored record.
    async fn insert_role(&self, name: &NonEmptyString, description: &str) -> AppResult<Role>;

    /// Overwrites name and description of an existing role.
    async fn update_role(&self, role: &Role) -> AppResult<()>;

    /// Deletes a role by surrogate key.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Finds a permission by unique name.
    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    /// Finds a permission by surrogate key.
    async fn find_permission_by_id(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>>;

    /// Lists all permissions in storage scan order.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Inserts a permission and returns the stored record.
    async fn insert_permission(
        &self,
        name: &NonEmptyString,
        description: &str,
    ) -> AppResult<Permission>;

    /// Overwrites name and description of an existing permission.
    async fn update_permission(&self, permission: &Permission) -> AppResult<()>;

    /// Deletes a permission by surrogate key.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Finds the grant linking a role to a permission.
    async fn find_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Option<RolePermission>>;

    /// Lists role grants matching the query.
    async fn list_role_permissions(
        &self,
        query: RolePermissionQuery,
    ) -> AppResult<Vec<RolePermission>>;

    /// Inserts a role grant.
    async fn insert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermission>;

    /// Deletes role grants matching the query and returns the deleted count.
    async fn delete_role_permissions(&self, query: RolePermissionQuery) -> AppResult<u64>;

    /// Finds the grant linking a user to a role.
    async fn find_user_role(&self, user_id: UserId, role_id: RoleId)
    -> AppResult<Option<UserRole>>;

    /// Lists user grants matching the query.
    async fn list_user_roles(&self, query: UserRoleQuery) -> AppResult<Vec<UserRole>>;

    /// Inserts a user grant.
    async fn insert_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<UserRole>;

    /// Deletes user grants matching the query and returns the deleted count.
    async fn delete_user_roles(&self, query: UserRoleQuery) -> AppResult<u64>;
}

/// Transactional scope over the entity store.
///
/// Writes become visible to other callers only after [`commit`]. The
/// `lock_*` lookups hold the returned row until the scope ends, where the
/// store supports row locks.
///
/// [`commit`]: AuthorityTransaction::commit
#[async_trait]
pub trait AuthorityTransaction: Send {
    /// Finds and locks a role by unique name.
    async fn lock_role_by_name(&mut self, name: &str) -> AppResult<Option<Role>>;

    /// Finds and locks a permission by unique name.
    async fn lock_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>>;

    /// Finds a permission by unique name without locking it.
    async fn find_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>>;

    /// Lists user grants matching the query.
    async fn list_user_roles(&mut self, query: UserRoleQuery) -> AppResult<Vec<UserRole>>;

    /// Lists role grants matching the query.
    async fn list_role_permissions(
        &mut self,
        query: RolePermissionQuery,
    ) -> AppResult<Vec<RolePermission>>;

    /// Inserts a role grant.
    async fn insert_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermission>;

    /// Deletes role grants matching the query and returns the deleted count.
    async fn delete_role_permissions(&mut self, query: RolePermissionQuery) -> AppResult<u64>;

    /// Deletes a role by surrogate key.
    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<()>;

    /// Deletes a permission by surrogate key.
    async fn delete_permission(&mut self, permission_id: PermissionId) -> AppResult<()>;

    /// Makes every write of this scope durable.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discards every write of this scope.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
