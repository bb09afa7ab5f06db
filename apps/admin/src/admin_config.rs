use std::env;
use std::path::PathBuf;

use authority_core::{AppError, TablePrefix};
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// What the admin binary does after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminMode {
    /// Create missing authority tables and report counts.
    Bootstrap,
    /// Bootstrap, then apply a seed document.
    Seed(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub mode: AdminMode,
    pub database_url: String,
    pub max_connections: u32,
    pub table_prefix: TablePrefix,
}

impl AdminConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_source(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_source<F>(mode: Option<&str>, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match mode.unwrap_or("bootstrap") {
            "bootstrap" => AdminMode::Bootstrap,
            "seed" => AdminMode::Seed(PathBuf::from(required(&lookup, "AUTHORITY_SEED_FILE")?)),
            other => {
                return Err(AppError::Validation(format!(
                    "mode must be either 'bootstrap' or 'seed', got '{other}'"
                )));
            }
        };

        let database_url = required(&lookup, "DATABASE_URL")?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let table_prefix = lookup("AUTHORITY_TABLE_PREFIX")
            .map(TablePrefix::new)
            .transpose()?
            .unwrap_or_else(TablePrefix::none);

        Ok(Self {
            mode,
            database_url,
            max_connections,
            table_prefix,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(AppError::Validation(format!("{name} must not be empty"))),
        None => Err(AppError::Validation(format!("{name} is required"))),
    }
}
