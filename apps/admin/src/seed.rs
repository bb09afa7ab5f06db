use std::fs;
use std::path::Path;

use authority_application::{AuthoritySeed, AuthorityService};
use authority_core::{AppError, AppResult};
use tracing::info;

pub async fn run(service: &AuthorityService, path: &Path) -> AppResult<()> {
    let document = fs::read_to_string(path).map_err(|error| {
        AppError::Validation(format!(
            "failed to read seed file '{}': {error}",
            path.display()
        ))
    })?;
    let seed = AuthoritySeed::from_json(&document)?;

    let report = service.apply_seed(&seed).await?;
    info!(
        file = %path.display(),
        assignments_created = report.assignments_created,
        "seed file applied"
    );

    Ok(())
}
