use authority_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::PermissionId;

/// Named capability that can be granted to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: NonEmptyString,
    description: String,
}

impl Permission {
    /// Creates a validated permission record.
    pub fn new(
        id: PermissionId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            description: description.into(),
        })
    }

    /// Returns the surrogate key.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the unique permission name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Replaces name and description, keeping the identity.
    #[must_use]
    pub fn renamed(self, name: NonEmptyString, description: impl Into<String>) -> Self {
        Self {
            id: self.id,
            name,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::Permission;
    use crate::PermissionId;

    #[test]
    fn permission_keeps_description() {
        let permission = Permission::new(PermissionId::new(3), "invoice.read", "read invoices")
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(permission.name().as_str(), "invoice.read");
        assert_eq!(permission.description(), "read invoices");
    }

    proptest! {
        #[test]
        fn whitespace_only_names_are_rejected(name in "[ \t\n]{0,8}") {
            prop_assert!(Permission::new(PermissionId::new(1), name, "").is_err());
        }
    }
}
