use serde::{Deserialize, Serialize};
use tracing::info;

use authority_core::{AppError, AppResult};
use authority_domain::UserId;

use crate::AuthorityService;

/// Declarative authority state applied by [`AuthorityService::apply_seed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoritySeed {
    /// Permissions to create when missing.
    #[serde(default)]
    pub permissions: Vec<SeedPermission>,
    /// Roles to create when missing, each with its exact grant set.
    #[serde(default)]
    pub roles: Vec<SeedRole>,
    /// User role assignments to ensure.
    #[serde(default)]
    pub assignments: Vec<SeedAssignment>,
}

/// Seeded permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPermission {
    /// Unique permission name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
}

/// Seeded role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRole {
    /// Unique role name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Permission names the role grants after seeding, replacing earlier grants.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Seeded user assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAssignment {
    /// Host-application user identifier.
    pub user_id: UserId,
    /// Role names the user should hold.
    pub roles: Vec<String>,
}

/// Outcome counts of one seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthoritySeedReport {
    /// Permissions ensured.
    pub permissions: usize,
    /// Roles ensured and synchronized.
    pub roles: usize,
    /// Assignments written by this run.
    pub assignments_created: usize,
    /// Assignments that already existed.
    pub assignments_existing: usize,
}

impl AuthoritySeed {
    /// Parses a seed document from JSON.
    pub fn from_json(document: &str) -> AppResult<Self> {
        serde_json::from_str(document)
            .map_err(|error| AppError::Validation(format!("invalid authority seed: {error}")))
    }
}

impl AuthorityService {
    /// Applies a seed document. Running the same seed twice is a no-op.
    ///
    /// Names are trimmed the way `create_role` and `create_permission` store
    /// them, so later lookups in the same run find the created rows.
    pub async fn apply_seed(&self, seed: &AuthoritySeed) -> AppResult<AuthoritySeedReport> {
        let mut report = AuthoritySeedReport::default();

        for permission in &seed.permissions {
            self.create_permission(permission.name.trim(), &permission.description)
                .await?;
            report.permissions += 1;
        }

        for role in &seed.roles {
            let role_name = role.name.trim();
            let permission_names: Vec<&str> =
                role.permissions.iter().map(|name| name.trim()).collect();

            self.create_role(role_name, &role.description).await?;
            self.sync_assign_permissions(role_name, &permission_names)
                .await?;
            report.roles += 1;
        }

        for assignment in &seed.assignments {
            for role_name in &assignment.roles {
                match self.assign_role(assignment.user_id, role_name.trim()).await {
                    Ok(()) => report.assignments_created += 1,
                    Err(AppError::RoleAlreadyAssigned(_)) => report.assignments_existing += 1,
                    Err(error) => return Err(error),
                }
            }
        }

        info!(
            permissions = report.permissions,
            roles = report.roles,
            assignments_created = report.assignments_created,
            assignments_existing = report.assignments_existing,
            "authority seed applied"
        );

        Ok(report)
    }
}
