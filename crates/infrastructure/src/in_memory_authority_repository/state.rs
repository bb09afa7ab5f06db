use super::*;

/// Per-table id sequences, matching `BIGSERIAL` numbering.
#[derive(Debug, Clone, Copy, Default)]
struct Sequences {
    roles: i64,
    permissions: i64,
    role_permissions: i64,
    user_roles: i64,
}

fn next(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

fn take_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(usize::MAX)
}

/// Table contents keyed by id, so iteration follows id order.
#[derive(Debug, Clone, Default)]
pub(super) struct AuthorityState {
    pub(super) roles: BTreeMap<RoleId, Role>,
    pub(super) permissions: BTreeMap<PermissionId, Permission>,
    role_permissions: BTreeMap<RolePermissionId, RolePermission>,
    user_roles: BTreeMap<UserRoleId, UserRole>,
    sequences: Sequences,
}

impl AuthorityState {
    pub(super) fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|role| role.name().as_str() == name)
    }

    pub(super) fn permission_by_name(&self, name: &str) -> Option<&Permission> {
        self.permissions
            .values()
            .find(|permission| permission.name().as_str() == name)
    }

    pub(super) fn insert_role(
        &mut self,
        name: &NonEmptyString,
        description: &str,
    ) -> AppResult<Role> {
        if self.role_by_name(name.as_str()).is_some() {
            return Err(AppError::Conflict(format!("role '{name}' already exists")));
        }

        let role = Role::new(
            RoleId::new(next(&mut self.sequences.roles)),
            name.as_str(),
            description,
        )?;
        self.roles.insert(role.id(), role.clone());
        Ok(role)
    }

    pub(super) fn update_role(&mut self, role: &Role) -> AppResult<()> {
        if self
            .role_by_name(role.name().as_str())
            .is_some_and(|stored| stored.id() != role.id())
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        if let Some(stored) = self.roles.get_mut(&role.id()) {
            *stored = role.clone();
        }
        Ok(())
    }

    pub(super) fn delete_role(&mut self, role_id: RoleId) -> AppResult<()> {
        let referenced = self
            .role_permissions
            .values()
            .any(|grant| grant.role_id() == role_id)
            || self
                .user_roles
                .values()
                .any(|grant| grant.role_id() == role_id);
        if referenced {
            return Err(AppError::Storage(format!(
                "role {role_id} is still referenced by grants"
            )));
        }

        self.roles.remove(&role_id);
        Ok(())
    }

    pub(super) fn insert_permission(
        &mut self,
        name: &NonEmptyString,
        description: &str,
    ) -> AppResult<Permission> {
        if self.permission_by_name(name.as_str()).is_some() {
            return Err(AppError::Conflict(format!(
                "permission '{name}' already exists"
            )));
        }

        let permission = Permission::new(
            PermissionId::new(next(&mut self.sequences.permissions)),
            name.as_str(),
            description,
        )?;
        self.permissions.insert(permission.id(), permission.clone());
        Ok(permission)
    }

    pub(super) fn update_permission(&mut self, permission: &Permission) -> AppResult<()> {
        if self
            .permission_by_name(permission.name().as_str())
            .is_some_and(|stored| stored.id() != permission.id())
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.name()
            )));
        }

        if let Some(stored) = self.permissions.get_mut(&permission.id()) {
            *stored = permission.clone();
        }
        Ok(())
    }

    pub(super) fn delete_permission(&mut self, permission_id: PermissionId) -> AppResult<()> {
        if self
            .role_permissions
            .values()
            .any(|grant| grant.permission_id() == permission_id)
        {
            return Err(AppError::Storage(format!(
                "permission {permission_id} is still referenced by grants"
            )));
        }

        self.permissions.remove(&permission_id);
        Ok(())
    }

    pub(super) fn role_permissions(&self, query: &RolePermissionQuery) -> Vec<RolePermission> {
        self.role_permissions
            .values()
            .filter(|grant| query.matches(grant))
            .take(take_limit(query.limit))
            .copied()
            .collect()
    }

    pub(super) fn insert_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermission> {
        if !self.roles.contains_key(&role_id) || !self.permissions.contains_key(&permission_id) {
            return Err(AppError::Storage(format!(
                "grant of permission {permission_id} to role {role_id} references a missing row"
            )));
        }

        let query = RolePermissionQuery::for_role(role_id).with_permission(permission_id);
        if !self.role_permissions(&query).is_empty() {
            return Err(AppError::Conflict(format!(
                "grant of permission {permission_id} to role {role_id} already exists"
            )));
        }

        let grant = RolePermission::new(
            RolePermissionId::new(next(&mut self.sequences.role_permissions)),
            role_id,
            permission_id,
        );
        self.role_permissions.insert(grant.id(), grant);
        Ok(grant)
    }

    pub(super) fn delete_role_permissions(
        &mut self,
        query: &RolePermissionQuery,
    ) -> AppResult<u64> {
        if query.is_unfiltered() {
            return Err(AppError::Validation(
                "refusing to delete role permissions without a filter".to_owned(),
            ));
        }

        let before = self.role_permissions.len();
        self.role_permissions.retain(|_, grant| !query.matches(grant));
        Ok(u64::try_from(before - self.role_permissions.len()).unwrap_or(u64::MAX))
    }

    pub(super) fn user_roles(&self, query: &UserRoleQuery) -> Vec<UserRole> {
        self.user_roles
            .values()
            .filter(|grant| query.matches(grant))
            .take(take_limit(query.limit))
            .copied()
            .collect()
    }

    pub(super) fn insert_user_role(
        &mut self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<UserRole> {
        if !self.roles.contains_key(&role_id) {
            return Err(AppError::Storage(format!(
                "assignment of role {role_id} references a missing row"
            )));
        }

        let query = UserRoleQuery::for_user(user_id).with_role(role_id);
        if !self.user_roles(&query).is_empty() {
            return Err(AppError::Conflict(format!(
                "assignment of role {role_id} to user {user_id} already exists"
            )));
        }

        let grant = UserRole::new(
            UserRoleId::new(next(&mut self.sequences.user_roles)),
            user_id,
            role_id,
        );
        self.user_roles.insert(grant.id(), grant);
        Ok(grant)
    }

    pub(super) fn delete_user_roles(&mut self, query: &UserRoleQuery) -> AppResult<u64> {
        if query.is_unfiltered() {
            return Err(AppError::Validation(
                "refusing to delete user roles without a filter".to_owned(),
            ));
        }

        let before = self.user_roles.len();
        self.user_roles.retain(|_, grant| !query.matches(grant));
        Ok(u64::try_from(before - self.user_roles.len()).unwrap_or(u64::MAX))
    }
}
