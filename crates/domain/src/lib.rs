//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod grant;
mod identifiers;
mod permission;
mod role;
mod user;

pub use grant::{RolePermission, UserRole};
pub use identifiers::{PermissionId, RoleId, RolePermissionId, UserRoleId};
pub use permission::Permission;
pub use role::Role;
pub use user::UserId;
