use super::*;

impl AuthorityService {
    /// Assigns a role to a user.
    ///
    /// Fails with [`AppError::RoleAlreadyAssigned`] when the user already
    /// holds the role.
    pub async fn assign_role(&self, user_id: UserId, role_name: &str) -> AppResult<()> {
        let role = self.resolve_role(role_name).await?;

        if self
            .repository
            .find_user_role(user_id, role.id())
            .await?
            .is_some()
        {
            return Err(already_assigned(user_id, role_name));
        }

        match self.repository.insert_user_role(user_id, role.id()).await {
            Ok(_) => {
                info!(%user_id, role = role_name, "role assigned");
                Ok(())
            }
            Err(AppError::Conflict(_)) => Err(already_assigned(user_id, role_name)),
            Err(error) => Err(error),
        }
    }

    /// Removes a role from a user. A missing assignment is not an error.
    pub async fn revoke_role(&self, user_id: UserId, role_name: &str) -> AppResult<()> {
        let role = self.resolve_role(role_name).await?;

        let revoked = self
            .repository
            .delete_user_roles(UserRoleQuery::for_user(user_id).with_role(role.id()))
            .await?;

        if revoked > 0 {
            info!(%user_id, role = role_name, "role revoked");
        }
        Ok(())
    }

    /// Returns whether a user holds a role.
    pub async fn check_role(&self, user_id: UserId, role_name: &str) -> AppResult<bool> {
        let role = self.resolve_role(role_name).await?;

        Ok(self
            .repository
            .find_user_role(user_id, role.id())
            .await?
            .is_some())
    }

    /// Returns the names of all roles a user holds.
    pub async fn get_user_roles(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let role_ids = self.user_role_ids(user_id).await?;
        Ok(self.role_names(role_ids).await)
    }

    /// Removes a permission from every role the user holds.
    ///
    /// This changes the roles themselves, so other holders of those roles lose
    /// the permission too. A user without roles is a no-op.
    pub async fn revoke_permission(&self, user_id: UserId, permission_name: &str) -> AppResult<()> {
        let role_ids = self.user_role_ids(user_id).await?;
        let permission = self.resolve_permission(permission_name).await?;

        if role_ids.is_empty() {
            debug!(%user_id, "user holds no roles");
            return Ok(());
        }

        let revoked = self
            .repository
            .delete_role_permissions(
                RolePermissionQuery::for_roles(role_ids).with_permission(permission.id()),
            )
            .await?;

        info!(
            %user_id,
            permission = permission_name,
            revoked,
            "permission revoked from user roles"
        );
        Ok(())
    }

    /// Returns whether any role held by the user grants the permission.
    ///
    /// An unknown permission is [`AppError::PermissionNotFound`] even for a
    /// user without roles; a known one yields `false` in that case.
    pub async fn check_permission(
        &self,
        user_id: UserId,
        permission_name: &str,
    ) -> AppResult<bool> {
        let role_ids = self.user_role_ids(user_id).await?;
        let permission = self.resolve_permission(permission_name).await?;

        if role_ids.is_empty() {
            return Ok(false);
        }

        let grants = self
            .repository
            .list_role_permissions(
                RolePermissionQuery::for_roles(role_ids)
                    .with_permission(permission.id())
                    .limit(1),
            )
            .await?;

        Ok(!grants.is_empty())
    }

    /// Returns the names of every permission reachable through the user's roles.
    ///
    /// A permission granted by several held roles appears once per role.
    pub async fn get_user_permissions(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let role_ids = self.user_role_ids(user_id).await?;
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let grants = self
            .repository
            .list_role_permissions(RolePermissionQuery::for_roles(role_ids))
            .await?;

        Ok(self
            .permission_names(grants.into_iter().map(|grant| grant.permission_id()))
            .await)
    }
}

fn already_assigned(user_id: UserId, role_name: &str) -> AppError {
    debug!(%user_id, role = role_name, "role already assigned");
    AppError::RoleAlreadyAssigned(role_name.to_owned())
}
