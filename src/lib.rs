pub mod aggregate;
pub mod charts;
pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod stats;
pub mod zones;

#[cfg(test)]
mod test_utils;

use config::{Config, ConfigError};
use db::{AppState, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Load configuration, install logging and open the document cache
pub async fn start() -> Result<AppState, StartupError> {
  let config = Config::from_env()?;
  logging::init(&config.log_filter);
  start_with(config).await
}

/// Open the document cache for an already loaded configuration
pub async fn start_with(config: Config) -> Result<AppState, StartupError> {
  let db = db::initialize_db(&config.database_url).await?;

  tracing::info!(
    week_start = %config.week_start,
    club_id = config.club_id.as_deref().unwrap_or("none"),
    "squad load ready"
  );

  Ok(AppState { db, config })
}
