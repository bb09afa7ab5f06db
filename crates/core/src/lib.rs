//! Shared primitives for all Rust crates in the authority workspace.

#![forbid(unsafe_code)]

/// Storage naming primitives shared by adapters and hosts.
pub mod table_prefix;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use table_prefix::TablePrefix;

/// Result type used across authority crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Creates a validated non-empty string with surrounding whitespace removed.
    pub fn trimmed(value: impl AsRef<str>) -> AppResult<Self> {
        Self::new(value.as_ref().trim())
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
///
/// The first five variants are the authorization taxonomy hosts branch on.
/// `Storage` carries any entity store failure that is not a missing record.
#[derive(Debug, Error)]
pub enum AppError {
    /// A role name did not resolve to a stored role.
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// A permission name did not resolve to a stored permission.
    #[error("permission not found: {0}")]
    PermissionNotFound(String),

    /// The user already holds the role.
    #[error("role already assigned: {0}")]
    RoleAlreadyAssigned(String),

    /// The role is still assigned to at least one user.
    #[error("cannot delete assigned role: {0}")]
    RoleInUse(String),

    /// The permission is still granted to at least one role.
    #[error("cannot delete assigned permission: {0}")]
    PermissionInUse(String),

    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Entity store failure passed through to the caller.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Payload-free discriminant of [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`AppError::RoleNotFound`].
    RoleNotFound,
    /// See [`AppError::PermissionNotFound`].
    PermissionNotFound,
    /// See [`AppError::RoleAlreadyAssigned`].
    RoleAlreadyAssigned,
    /// See [`AppError::RoleInUse`].
    RoleInUse,
    /// See [`AppError::PermissionInUse`].
    PermissionInUse,
    /// See [`AppError::Validation`].
    Validation,
    /// See [`AppError::Conflict`].
    Conflict,
    /// See [`AppError::Storage`].
    Storage,
    /// See [`AppError::Internal`].
    Internal,
}

impl AppError {
    /// Returns the error kind without its message.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoleNotFound(_) => ErrorKind::RoleNotFound,
            Self::PermissionNotFound(_) => ErrorKind::PermissionNotFound,
            Self::RoleAlreadyAssigned(_) => ErrorKind::RoleAlreadyAssigned,
            Self::RoleInUse(_) => ErrorKind::RoleInUse,
            Self::PermissionInUse(_) => ErrorKind::PermissionInUse,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{AppError, ErrorKind, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn trimmed_strips_surrounding_whitespace() {
        let value = NonEmptyString::trimmed("  admin \n");
        assert_eq!(
            value.map(String::from).unwrap_or_default(),
            "admin".to_owned()
        );
    }

    #[test]
    fn error_kind_matches_variant() {
        let error = AppError::RoleInUse("admin".to_owned());
        assert_eq!(error.kind(), ErrorKind::RoleInUse);
        assert_eq!(error.to_string(), "cannot delete assigned role: admin");
    }

    proptest! {
        #[test]
        fn trimmed_never_keeps_outer_whitespace(value in "[ \t]{0,3}[a-z]{1,12}[ \t]{0,3}") {
            let parsed = NonEmptyString::trimmed(value.as_str());
            prop_assert!(parsed.is_ok());
            let parsed = parsed.unwrap_or_else(|_| unreachable!());
            prop_assert_eq!(parsed.as_str(), value.trim());
        }
    }
}
