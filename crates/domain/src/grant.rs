use serde::{Deserialize, Serialize};

use crate::{PermissionId, RoleId, RolePermissionId, UserId, UserRoleId};

/// Grant linking a role to a permission.
///
/// The referenced role and permission must exist when the grant is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolePermission {
    id: RolePermissionId,
    role_id: RoleId,
    permission_id: PermissionId,
}

impl RolePermission {
    /// Creates a grant record.
    #[must_use]
    pub fn new(id: RolePermissionId, role_id: RoleId, permission_id: PermissionId) -> Self {
        Self {
            id,
            role_id,
            permission_id,
        }
    }

    /// Returns the surrogate key.
    #[must_use]
    pub fn id(&self) -> RolePermissionId {
        self.id
    }

    /// Returns the granting role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the granted permission.
    #[must_use]
    pub fn permission_id(&self) -> PermissionId {
        self.permission_id
    }
}

/// Grant linking an external user to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRole {
    id: UserRoleId,
    user_id: UserId,
    role_id: RoleId,
}

impl UserRole {
    /// Creates a user grant record.
    #[must_use]
    pub fn new(id: UserRoleId, user_id: UserId, role_id: RoleId) -> Self {
        Self {
            id,
            user_id,
            role_id,
        }
    }

    /// Returns the surrogate key.
    #[must_use]
    pub fn id(&self) -> UserRoleId {
        self.id
    }

    /// Returns the user holding the role.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the held role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }
}
