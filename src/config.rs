//! Runtime configuration
//!
//! Read once from the environment (after loading `.env`). Every value has a
//! default so an empty environment yields a working in-memory setup.

use chrono::Weekday;
use serde::Serialize;
use std::env;

use crate::aggregate::PAST_SESSIONS_WINDOW;
use crate::charts::CLUSTER_WINDOW_SECS;

/// ---------------------------------------------------------------------------
/// Configuration Keys
/// ---------------------------------------------------------------------------

const DATABASE_URL_VAR: &str = "SQUAD_LOAD_DATABASE_URL";
const WEEK_START_VAR: &str = "SQUAD_LOAD_WEEK_START";
const PAST_SESSIONS_VAR: &str = "SQUAD_LOAD_PAST_SESSIONS";
const CLUSTER_WINDOW_VAR: &str = "SQUAD_LOAD_CLUSTER_WINDOW_SECS";
const LOG_VAR: &str = "SQUAD_LOAD_LOG";
const CLUB_ID_VAR: &str = "SQUAD_LOAD_CLUB_ID";

const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  Invalid { key: &'static str, value: String },
}

impl Serialize for ConfigError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub database_url: String,
  /// Club whose best match is the reference for matches
  pub club_id: Option<String>,
  pub week_start: Weekday,
  pub past_sessions: usize,
  pub cluster_window_secs: u32,
  pub log_filter: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      club_id: None,
      week_start: Weekday::Mon,
      past_sessions: PAST_SESSIONS_WINDOW,
      cluster_window_secs: CLUSTER_WINDOW_SECS,
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl Config {
  /// Load `.env` if present, then read the process environment
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_vars()
  }

  /// Read the process environment only
  pub fn from_vars() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let week_start = match env::var(WEEK_START_VAR) {
      Ok(raw) => parse_weekday(&raw).ok_or(ConfigError::Invalid {
        key: WEEK_START_VAR,
        value: raw,
      })?,
      Err(_) => defaults.week_start,
    };

    Ok(Self {
      database_url: env::var(DATABASE_URL_VAR).unwrap_or(defaults.database_url),
      club_id: env::var(CLUB_ID_VAR).ok().filter(|id| !id.trim().is_empty()),
      week_start,
      past_sessions: parse_var(PAST_SESSIONS_VAR, defaults.past_sessions)?,
      cluster_window_secs: parse_var(CLUSTER_WINDOW_VAR, defaults.cluster_window_secs)?,
      log_filter: env::var(LOG_VAR).unwrap_or(defaults.log_filter),
    })
  }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
  match env::var(key) {
    Ok(raw) => raw
      .trim()
      .parse()
      .map_err(|_| ConfigError::Invalid { key, value: raw }),
    Err(_) => Ok(default),
  }
}

/// Accepts `monday`, `mon`, `Sunday`, ...
fn parse_weekday(raw: &str) -> Option<Weekday> {
  raw.trim().parse::<Weekday>().ok()
}
