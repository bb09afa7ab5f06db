use super::*;

impl AuthorityService {
    /// Creates a role unless one with the same name already exists.
    ///
    /// Creating an existing name succeeds without touching the stored record.
    pub async fn create_role(&self, role_name: &str, description: &str) -> AppResult<()> {
        let name = validated_name(role_name)?;

        if self
            .repository
            .find_role_by_name(name.as_str())
            .await?
            .is_some()
        {
            debug!(role = %name, "role already exists");
            return Ok(());
        }

        match self.repository.insert_role(&name, description).await {
            Ok(role) => {
                info!(role = %name, role_id = %role.id(), "role created");
                Ok(())
            }
            Err(AppError::Conflict(_)) => {
                debug!(role = %name, "role created concurrently");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Creates a permission unless one with the same name already exists.
    pub async fn create_permission(
        &self,
        permission_name: &str,
        description: &str,
    ) -> AppResult<()> {
        let name = validated_name(permission_name)?;

        if self
            .repository
            .find_permission_by_name(name.as_str())
            .await?
            .is_some()
        {
            debug!(permission = %name, "permission already exists");
            return Ok(());
        }

        match self.repository.insert_permission(&name, description).await {
            Ok(permission) => {
                info!(permission = %name, permission_id = %permission.id(), "permission created");
                Ok(())
            }
            Err(AppError::Conflict(_)) => {
                debug!(permission = %name, "permission created concurrently");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Renames a role and replaces its description.
    ///
    /// An unknown `role_id` is not an error; the call does nothing.
    pub async fn update_role(
        &self,
        role_id: RoleId,
        new_name: &str,
        new_description: &str,
    ) -> AppResult<()> {
        let name = validated_name(new_name)?;

        let Some(role) = self.repository.find_role_by_id(role_id).await? else {
            debug!(%role_id, "ignoring update of missing role");
            return Ok(());
        };

        self.repository
            .update_role(&role.renamed(name, new_description))
            .await?;
        info!(%role_id, role = new_name.trim(), "role updated");
        Ok(())
    }

    /// Renames a permission and replaces its description.
    ///
    /// An unknown `permission_id` is not an error; the call does nothing.
    pub async fn update_permission(
        &self,
        permission_id: PermissionId,
        new_name: &str,
        new_description: &str,
    ) -> AppResult<()> {
        let name = validated_name(new_name)?;

        let Some(permission) = self.repository.find_permission_by_id(permission_id).await? else {
            debug!(%permission_id, "ignoring update of missing permission");
            return Ok(());
        };

        self.repository
            .update_permission(&permission.renamed(name, new_description))
            .await?;
        info!(%permission_id, permission = new_name.trim(), "permission updated");
        Ok(())
    }

    /// Deletes a role that no user holds, together with its permission grants.
    ///
    /// The in-use check, grant cleanup and delete share one transaction that
    /// locks the role row.
    pub async fn delete_role(&self, role_name: &str) -> AppResult<()> {
        let mut transaction = self.repository.begin().await?;
        let outcome = delete_role_in(transaction.as_mut(), role_name).await;
        let revoked_grants = finish_transaction(transaction, outcome).await?;

        info!(role = role_name, revoked_grants, "role deleted");
        Ok(())
    }

    /// Deletes a permission that no role grants.
    pub async fn delete_permission(&self, permission_name: &str) -> AppResult<()> {
        let mut transaction = self.repository.begin().await?;
        let outcome = delete_permission_in(transaction.as_mut(), permission_name).await;
        finish_transaction(transaction, outcome).await?;

        info!(permission = permission_name, "permission deleted");
        Ok(())
    }

    /// Returns a role record by name, if stored.
    pub async fn get_role(&self, role_name: &str) -> AppResult<Option<Role>> {
        self.repository.find_role_by_name(role_name).await
    }

    /// Returns a permission record by name, if stored.
    pub async fn get_permission(&self, permission_name: &str) -> AppResult<Option<Permission>> {
        self.repository.find_permission_by_name(permission_name).await
    }

    /// Returns all role names in storage order.
    pub async fn get_roles(&self) -> AppResult<Vec<String>> {
        Ok(self
            .get_roles_data()
            .await?
            .into_iter()
            .map(|role| role.name().to_string())
            .collect())
    }

    /// Returns all role records in storage order.
    pub async fn get_roles_data(&self) -> AppResult<Vec<Role>> {
        self.repository.list_roles().await
    }

    /// Returns all permission names in storage order.
    pub async fn get_permissions(&self) -> AppResult<Vec<String>> {
        Ok(self
            .get_permissions_data()
            .await?
            .into_iter()
            .map(|permission| permission.name().to_string())
            .collect())
    }

    /// Returns all permission records in storage order.
    pub async fn get_permissions_data(&self) -> AppResult<Vec<Permission>> {
        self.repository.list_permissions().await
    }
}

async fn delete_role_in(
    transaction: &mut dyn AuthorityTransaction,
    role_name: &str,
) -> AppResult<u64> {
    let role = transaction
        .lock_role_by_name(role_name)
        .await?
        .ok_or_else(|| AppError::RoleNotFound(role_name.to_owned()))?;

    let holders = transaction
        .list_user_roles(UserRoleQuery::for_role(role.id()).limit(1))
        .await?;
    if !holders.is_empty() {
        return Err(AppError::RoleInUse(role_name.to_owned()));
    }

    let revoked_grants = transaction
        .delete_role_permissions(RolePermissionQuery::for_role(role.id()))
        .await?;
    transaction.delete_role(role.id()).await?;

    Ok(revoked_grants)
}

async fn delete_permission_in(
    transaction: &mut dyn AuthorityTransaction,
    permission_name: &str,
) -> AppResult<()> {
    let permission = transaction
        .lock_permission_by_name(permission_name)
        .await?
        .ok_or_else(|| AppError::PermissionNotFound(permission_name.to_owned()))?;

    let grants = transaction
        .list_role_permissions(RolePermissionQuery::for_permission(permission.id()).limit(1))
        .await?;
    if !grants.is_empty() {
        return Err(AppError::PermissionInUse(permission_name.to_owned()));
    }

    transaction.delete_permission(permission.id()).await
}
