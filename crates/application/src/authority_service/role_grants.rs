use std::collections::HashSet;

use super::*;

impl AuthorityService {
    /// Grants permissions to a role, keeping grants it already has.
    ///
    /// Every name is resolved before the first write, so an unknown role or
    /// permission leaves the grant set untouched. The inserts themselves are
    /// not atomic: a storage failure partway through keeps earlier grants.
    /// Use [`AuthorityService::sync_assign_permissions`] for all-or-nothing
    /// replacement.
    pub async fn assign_permissions<S>(
        &self,
        role_name: &str,
        permission_names: &[S],
    ) -> AppResult<()>
    where
        S: AsRef<str> + Sync,
    {
        let role = self.resolve_role(role_name).await?;
        let permissions = self.resolve_permissions(permission_names).await?;

        let mut granted = 0_usize;
        for permission in &permissions {
            if self
                .repository
                .find_role_permission(role.id(), permission.id())
                .await?
                .is_some()
            {
                continue;
            }

            match self
                .repository
                .insert_role_permission(role.id(), permission.id())
                .await
            {
                Ok(_) => granted += 1,
                Err(AppError::Conflict(_)) => {
                    debug!(
                        role = role_name,
                        permission = %permission.name(),
                        "permission granted concurrently"
                    );
                }
                Err(error) => return Err(error),
            }
        }

        info!(
            role = role_name,
            requested = permissions.len(),
            granted,
            "permissions assigned"
        );
        Ok(())
    }

    /// Replaces the full grant set of a role in one transaction.
    ///
    /// Duplicate names are granted once. Any failure leaves the previous grant
    /// set in place.
    pub async fn sync_assign_permissions<S>(
        &self,
        role_name: &str,
        permission_names: &[S],
    ) -> AppResult<()>
    where
        S: AsRef<str> + Sync,
    {
        let mut transaction = self.repository.begin().await?;
        let outcome = replace_grants_in(transaction.as_mut(), role_name, permission_names).await;
        let (revoked, granted) = finish_transaction(transaction, outcome).await?;

        info!(role = role_name, revoked, granted, "permissions synchronized");
        Ok(())
    }

    /// Removes one permission from a role. A missing grant is not an error.
    pub async fn revoke_role_permission(
        &self,
        role_name: &str,
        permission_name: &str,
    ) -> AppResult<()> {
        let role = self.resolve_role(role_name).await?;
        let permission = self.resolve_permission(permission_name).await?;

        let revoked = self
            .repository
            .delete_role_permissions(
                RolePermissionQuery::for_role(role.id()).with_permission(permission.id()),
            )
            .await?;

        if revoked > 0 {
            info!(
                role = role_name,
                permission = permission_name,
                "role permission revoked"
            );
        }
        Ok(())
    }

    /// Returns whether a role grants a permission.
    pub async fn check_role_permission(
        &self,
        role_name: &str,
        permission_name: &str,
    ) -> AppResult<bool> {
        let role = self.resolve_role(role_name).await?;
        let permission = self.resolve_permission(permission_name).await?;

        Ok(self
            .repository
            .find_role_permission(role.id(), permission.id())
            .await?
            .is_some())
    }

    /// Returns the names of all permissions a role grants.
    pub async fn get_permissions_by_role(&self, role_name: &str) -> AppResult<Vec<String>> {
        let role = self.resolve_role(role_name).await?;

        let grants = self
            .repository
            .list_role_permissions(RolePermissionQuery::for_role(role.id()))
            .await?;

        Ok(self
            .permission_names(grants.into_iter().map(|grant| grant.permission_id()))
            .await)
    }
}

async fn replace_grants_in<S>(
    transaction: &mut dyn AuthorityTransaction,
    role_name: &str,
    permission_names: &[S],
) -> AppResult<(u64, usize)>
where
    S: AsRef<str> + Sync,
{
    let role = transaction
        .lock_role_by_name(role_name)
        .await?
        .ok_or_else(|| AppError::RoleNotFound(role_name.to_owned()))?;

    let mut seen = HashSet::with_capacity(permission_names.len());
    let mut permission_ids = Vec::with_capacity(permission_names.len());
    for permission_name in permission_names {
        let permission_name = permission_name.as_ref();
        let permission = transaction
            .find_permission_by_name(permission_name)
            .await?
            .ok_or_else(|| AppError::PermissionNotFound(permission_name.to_owned()))?;

        if seen.insert(permission.id()) {
            permission_ids.push(permission.id());
        }
    }

    let revoked = transaction
        .delete_role_permissions(RolePermissionQuery::for_role(role.id()))
        .await?;

    for permission_id in &permission_ids {
        transaction
            .insert_role_permission(role.id(), *permission_id)
            .await?;
    }

    Ok((revoked, permission_ids.len()))
}
