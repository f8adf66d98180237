//! Tracing subscriber setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber filtered by `filter` (e.g. `info`, `squad_load=debug`).
///
/// Falls back to `info` when the filter does not parse. Calling it again after
/// a subscriber is installed is a no-op.
pub fn init(filter: &str) {
  let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

  let installed = tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(true))
    .try_init()
    .is_ok();

  if installed {
    tracing::debug!(filter, "logging initialized");
  }
}
