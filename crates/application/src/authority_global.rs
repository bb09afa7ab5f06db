//! Process-wide access to one [`AuthorityService`].
//!
//! Optional: hosts that pass the service explicitly never need this.

use std::sync::OnceLock;

use authority_core::{AppError, AppResult};

use crate::AuthorityService;

static AUTHORITY: OnceLock<AuthorityService> = OnceLock::new();

/// Installs the process-wide authority. Only the first call succeeds.
pub fn install_global(service: AuthorityService) -> AppResult<&'static AuthorityService> {
    AUTHORITY.set(service).map_err(|_| {
        AppError::Conflict("a process-wide authority is already installed".to_owned())
    })?;

    AUTHORITY.get().ok_or_else(|| {
        AppError::Internal("process-wide authority vanished after install".to_owned())
    })
}

/// Returns the process-wide authority, if one was installed.
#[must_use]
pub fn resolve() -> Option<&'static AuthorityService> {
    AUTHORITY.get()
}
