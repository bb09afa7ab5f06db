//! Application services and ports.

#![forbid(unsafe_code)]

mod authority_global;
mod authority_ports;
mod authority_seed;
mod authority_service;

pub use authority_global::{install_global, resolve};
pub use authority_ports::{
    AuthorityRepository, AuthorityTransaction, RolePermissionQuery, UserRoleQuery,
};
pub use authority_seed::{
    AuthoritySeed, AuthoritySeedReport, SeedAssignment, SeedPermission, SeedRole,
};
pub use authority_service::AuthorityService;
