use authority_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::RoleId;

/// Named bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    description: String,
}

impl Role {
    /// Creates a validated role record.
    pub fn new(
        id: RoleId,
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
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique role name.
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
