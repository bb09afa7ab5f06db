use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a storage key.
            #[must_use]
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying storage key.
            #[must_use]
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

surrogate_id!(
    /// Surrogate key of a stored role.
    RoleId
);

surrogate_id!(
    /// Surrogate key of a stored permission.
    PermissionId
);

surrogate_id!(
    /// Surrogate key of a role-to-permission grant.
    RolePermissionId
);

surrogate_id!(
    /// Surrogate key of a user-to-role grant.
    UserRoleId
);
