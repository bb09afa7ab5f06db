use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Maximum accepted prefix length.
///
/// Postgres truncates identifiers at 63 bytes. The longest explicitly named
/// object is `role_permissions_permission_id_idx` (34 bytes), so a prefix of
/// this length still yields an untruncated name.
pub const TABLE_PREFIX_MAX_LENGTH: usize = 29;

/// Validated prefix applied to every authority table name.
///
/// Only lowercase ASCII letters, digits and `_` are accepted and the first
/// character may not be a digit, so prefixed names can be spliced into SQL
/// without quoting. The empty prefix is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TablePrefix(String);

impl TablePrefix {
    /// Creates a validated table prefix.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.len() > TABLE_PREFIX_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "table prefix must not exceed {TABLE_PREFIX_MAX_LENGTH} characters"
            )));
        }

        if value.starts_with(|character: char| character.is_ascii_digit()) {
            return Err(AppError::Validation(format!(
                "table prefix '{value}' must not start with a digit"
            )));
        }

        if let Some(invalid) = value.chars().find(|character| {
            !(character.is_ascii_lowercase() || character.is_ascii_digit() || *character == '_')
        }) {
            return Err(AppError::Validation(format!(
                "table prefix '{value}' contains invalid character '{invalid}'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns an empty prefix.
    #[must_use]
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Returns the underlying prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `name` with this prefix applied.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        format!("{}{name}", self.0)
    }
}

impl TryFrom<String> for TablePrefix {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TablePrefix> for String {
    fn from(value: TablePrefix) -> Self {
        value.0
    }
}

impl Display for TablePrefix {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}
