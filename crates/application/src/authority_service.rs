use std::sync::Arc;

use tracing::{debug, info, warn};

use authority_core::{AppError, AppResult, NonEmptyString};
use authority_domain::{Permission, PermissionId, Role, RoleId, UserId};

use crate::authority_ports::{
    AuthorityRepository, AuthorityTransaction, RolePermissionQuery, UserRoleQuery,
};

mod registry;
mod role_grants;
mod user_grants;


/// Role-based access control authority.
///
/// Owns the role, permission and grant invariants and answers authorization
/// queries against an [`AuthorityRepository`]. The service holds no state of
/// its own beyond the repository handle, so clones share the same store.
#[derive(Clone)]
pub struct AuthorityService {
    repository: Arc<dyn AuthorityRepository>,
}

impl AuthorityService {
    /// Creates a service over a store whose schema already exists.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorityRepository>) -> Self {
        Self { repository }
    }

    /// Bootstraps the store schema and creates a service over it.
    pub async fn initialize(repository: Arc<dyn AuthorityRepository>) -> AppResult<Self> {
        repository.ensure_schema().await?;
        info!("authority schema ready");
        Ok(Self::new(repository))
    }

    async fn resolve_role(&self, role_name: &str) -> AppResult<Role> {
        self.repository
            .find_role_by_name(role_name)
            .await?
            .ok_or_else(|| AppError::RoleNotFound(role_name.to_owned()))
    }

    async fn resolve_permission(&self, permission_name: &str) -> AppResult<Permission> {
        self.repository
            .find_permission_by_name(permission_name)
            .await?
            .ok_or_else(|| AppError::PermissionNotFound(permission_name.to_owned()))
    }

    /// Resolves every name before returning, failing on the first unknown one.
    async fn resolve_permissions<S>(&self, permission_names: &[S]) -> AppResult<Vec<Permission>>
    where
        S: AsRef<str> + Sync,
    {
        let mut permissions = Vec::with_capacity(permission_names.len());
        for permission_name in permission_names {
            permissions.push(self.resolve_permission(permission_name.as_ref()).await?);
        }

        Ok(permissions)
    }

    async fn user_role_ids(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        Ok(self
            .repository
            .list_user_roles(UserRoleQuery::for_user(user_id))
            .await?
            .into_iter()
            .map(|user_role| user_role.role_id())
            .collect())
    }

    /// Maps role ids to names, skipping ids that no longer resolve.
    async fn role_names(&self, role_ids: impl IntoIterator<Item = RoleId>) -> Vec<String> {
        let mut names = Vec::new();
        for role_id in role_ids {
            match self.repository.find_role_by_id(role_id).await {
                Ok(Some(role)) => names.push(role.name().to_string()),
                Ok(None) => warn!(%role_id, "skipping grant of missing role"),
                Err(error) => warn!(%role_id, %error, "skipping grant of unresolvable role"),
            }
        }

        names
    }

    /// Maps permission ids to names, skipping ids that no longer resolve.
    async fn permission_names(
        &self,
        permission_ids: impl IntoIterator<Item = PermissionId>,
    ) -> Vec<String> {
        let mut names = Vec::new();
        for permission_id in permission_ids {
            match self.repository.find_permission_by_id(permission_id).await {
                Ok(Some(permission)) => names.push(permission.name().to_string()),
                Ok(None) => warn!(%permission_id, "skipping grant of missing permission"),
                Err(error) => {
                    warn!(%permission_id, %error, "skipping grant of unresolvable permission");
                }
            }
        }

        names
    }
}

/// Commits on success and rolls back on failure, returning the original outcome.
async fn finish_transaction<T>(
    transaction: Box<dyn AuthorityTransaction>,
    outcome: AppResult<T>,
) -> AppResult<T> {
    match outcome {
        Ok(value) => {
            transaction.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = transaction.rollback().await {
                warn!(error = %rollback_error, "failed to roll back authority transaction");
            }
            Err(error)
        }
    }
}

fn validated_name(value: &str) -> AppResult<NonEmptyString> {
    NonEmptyString::trimmed(value)
}
