//! Authority administration entry point: bootstraps tables and applies seeds.

#![forbid(unsafe_code)]

mod admin_config;
mod seed;

use std::sync::Arc;

use authority_application::AuthorityService;
use authority_core::AppError;
use authority_infrastructure::PostgresAuthorityRepository;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::admin_config::{AdminConfig, AdminMode, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AdminConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Storage(format!("failed to connect to database: {error}")))?;

    let repository = Arc::new(PostgresAuthorityRepository::new(
        pool,
        config.table_prefix.clone(),
    ));
    let service = AuthorityService::initialize(repository).await?;

    if let AdminMode::Seed(path) = &config.mode {
        seed::run(&service, path).await?;
    }

    let roles = service.get_roles().await?;
    let permissions = service.get_permissions().await?;
    info!(
        prefix = %config.table_prefix,
        roles = roles.len(),
        permissions = permissions.len(),
        "authority store ready"
    );

    Ok(())
}
