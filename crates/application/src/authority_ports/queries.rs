use authority_domain::{PermissionId, RoleId, RolePermission, UserId, UserRole};

/// Filter for reading or deleting role-to-permission grants.
///
/// Unset fields do not constrain the match. `role_ids: Some(vec![])` matches
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePermissionQuery {
    /// Restricts matches to grants of these roles.
    pub role_ids: Option<Vec<RoleId>>,
    /// Restricts matches to grants of this permission.
    pub permission_id: Option<PermissionId>,
    /// Maximum rows returned by reads. Ignored by deletes.
    pub limit: Option<usize>,
}

impl RolePermissionQuery {
    /// Matches every grant of one role.
    #[must_use]
    pub fn for_role(role_id: RoleId) -> Self {
        Self::for_roles(vec![role_id])
    }

    /// Matches every grant of any of the given roles.
    #[must_use]
    pub fn for_roles(role_ids: Vec<RoleId>) -> Self {
        Self {
            role_ids: Some(role_ids),
            ..Self::default()
        }
    }

    /// Matches every grant of one permission.
    #[must_use]
    pub fn for_permission(permission_id: PermissionId) -> Self {
        Self {
            permission_id: Some(permission_id),
            ..Self::default()
        }
    }

    /// Further restricts matches to one permission.
    #[must_use]
    pub fn with_permission(mut self, permission_id: PermissionId) -> Self {
        self.permission_id = Some(permission_id);
        self
    }

    /// Caps the number of rows returned by reads.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true when no field constrains the match.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.role_ids.is_none() && self.permission_id.is_none()
    }

    /// Returns whether a grant satisfies the filter.
    #[must_use]
    pub fn matches(&self, grant: &RolePermission) -> bool {
        self.role_ids
            .as_ref()
            .is_none_or(|role_ids| role_ids.contains(&grant.role_id()))
            && self
                .permission_id
                .is_none_or(|permission_id| permission_id == grant.permission_id())
    }
}

/// Filter for reading or deleting user-to-role grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRoleQuery {
    /// Restricts matches to grants held by this user.
    pub user_id: Option<UserId>,
    /// Restricts matches to grants of this role.
    pub role_id: Option<RoleId>,
    /// Maximum rows returned by reads. Ignored by deletes.
    pub limit: Option<usize>,
}

impl UserRoleQuery {
    /// Matches every role held by one user.
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Matches every holder of one role.
    #[must_use]
    pub fn for_role(role_id: RoleId) -> Self {
        Self {
            role_id: Some(role_id),
            ..Self::default()
        }
    }

    /// Further restricts matches to one role.
    #[must_use]
    pub fn with_role(mut self, role_id: RoleId) -> Self {
        self.role_id = Some(role_id);
        self
    }

    /// Caps the number of rows returned by reads.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true when no field constrains the match.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.user_id.is_none() && self.role_id.is_none()
    }

    /// Returns whether a grant satisfies the filter.
    #[must_use]
    pub fn matches(&self, grant: &UserRole) -> bool {
        self.user_id
            .is_none_or(|user_id| user_id == grant.user_id())
            && self.role_id.is_none_or(|role_id| role_id == grant.role_id())
    }
}
