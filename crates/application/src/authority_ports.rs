mod queries;
mod repository;

pub use queries::{RolePermissionQuery, UserRoleQuery};
pub use repository::{AuthorityRepository, AuthorityTransaction};
