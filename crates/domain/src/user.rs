//! External user identity as seen by the authority.
//!
//! Users are owned by the host application; the authority only stores their
//! opaque identifier on role grants.

use std::str::FromStr;

use authority_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a host-application user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
    }
}
