//! Local document cache
//!
//! Events, players and clubs arrive from the remote store as JSON documents.
//! They are kept here whole, next to the few columns range queries need.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;
use crate::models::{Club, Event, Player};

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
#[derive(Debug)]
pub struct AppState {
  pub db: DbPool,
  pub config: Config,
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Invalid document: {0}")]
  Document(#[from] serde_json::Error),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },
}

impl Serialize for StoreError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Pool Setup
/// ---------------------------------------------------------------------------

/// Open the pool and run migrations.
///
/// In-memory databases get a single connection that never expires; a second
/// connection would see a different, empty database.
pub async fn initialize_db(database_url: &str) -> Result<DbPool, StoreError> {
  tracing::info!(database_url, "initializing document cache");

  let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

  let pool = if database_url.contains(":memory:") {
    SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect_with(options)
      .await?
  } else {
    SqlitePoolOptions::new()
      .max_connections(5)
      .connect_with(options)
      .await?
  };

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("document cache ready");
  Ok(pool)
}

/// Parse `document` columns back into their models
fn decode<T: DeserializeOwned>(rows: Vec<(String,)>) -> Result<Vec<T>, StoreError> {
  rows
    .into_iter()
    .map(|(document,)| serde_json::from_str(&document).map_err(StoreError::from))
    .collect()
}

/// At most one document, `NotFound` when the row is missing
fn decode_one<T: DeserializeOwned>(row: Option<(String,)>, kind: &'static str, id: &str) -> Result<T, StoreError> {
  match row {
    Some((document,)) => Ok(serde_json::from_str(&document)?),
    None => Err(StoreError::NotFound {
      kind,
      id: id.to_string(),
    }),
  }
}

/// ---------------------------------------------------------------------------
/// Events
/// ---------------------------------------------------------------------------

/// Insert or replace an event, e.g. on every live update while tracking
pub async fn upsert_event(pool: &DbPool, event: &Event) -> Result<(), StoreError> {
  let document = serde_json::to_string(event)?;

  sqlx::query(
    r#"
    INSERT INTO events (id, kind, start_time_ms, finished, document, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
    ON CONFLICT(id) DO UPDATE SET
      kind = excluded.kind,
      start_time_ms = excluded.start_time_ms,
      finished = excluded.finished,
      document = excluded.document,
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(&event.id)
  .bind(event.kind.as_str())
  .bind(event.start_time.timestamp_millis())
  .bind(event.finished)
  .bind(document)
  .execute(pool)
  .await?;

  tracing::debug!(event_id = %event.id, "event cached");
  Ok(())
}

pub async fn get_event(pool: &DbPool, id: &str) -> Result<Event, StoreError> {
  let row: Option<(String,)> = sqlx::query_as("SELECT document FROM events WHERE id = ?1")
    .bind(id)
    .fetch_optional(pool)
    .await?;

  decode_one(row, "event", id)
}

/// All events, oldest first
pub async fn list_events(pool: &DbPool) -> Result<Vec<Event>, StoreError> {
  let rows: Vec<(String,)> = sqlx::query_as("SELECT document FROM events ORDER BY start_time_ms ASC, id ASC")
    .fetch_all(pool)
    .await?;
  decode(rows)
}

/// Events starting in `[start, end)`, oldest first
pub async fn list_events_between(
  pool: &DbPool,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
) -> Result<Vec<Event>, StoreError> {
  let rows: Vec<(String,)> = sqlx::query_as(
    r#"
    SELECT document FROM events
    WHERE start_time_ms >= ?1 AND start_time_ms < ?2
    ORDER BY start_time_ms ASC, id ASC
    "#,
  )
  .bind(start.timestamp_millis())
  .bind(end.timestamp_millis())
  .fetch_all(pool)
  .await?;
  decode(rows)
}

/// Finished events starting at or before `until`, oldest first
pub async fn list_finished_events(pool: &DbPool, until: DateTime<Utc>) -> Result<Vec<Event>, StoreError> {
  let rows: Vec<(String,)> = sqlx::query_as(
    r#"
    SELECT document FROM events
    WHERE finished = 1 AND start_time_ms <= ?1
    ORDER BY start_time_ms ASC, id ASC
    "#,
  )
  .bind(until.timestamp_millis())
  .fetch_all(pool)
  .await?;
  decode(rows)
}

/// ---------------------------------------------------------------------------
/// Players
/// ---------------------------------------------------------------------------

pub async fn upsert_player(pool: &DbPool, player: &Player) -> Result<(), StoreError> {
  let document = serde_json::to_string(player)?;

  sqlx::query(
    r#"
    INSERT INTO players (id, name, document, updated_at)
    VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
    ON CONFLICT(id) DO UPDATE SET
      name = excluded.name,
      document = excluded.document,
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(&player.id)
  .bind(&player.name)
  .bind(document)
  .execute(pool)
  .await?;

  Ok(())
}

/// All players ordered by name
pub async fn list_players(pool: &DbPool) -> Result<Vec<Player>, StoreError> {
  let rows: Vec<(String,)> = sqlx::query_as("SELECT document FROM players ORDER BY name ASC, id ASC")
    .fetch_all(pool)
    .await?;

  decode(rows)
}

/// ---------------------------------------------------------------------------
/// Clubs
/// ---------------------------------------------------------------------------

pub async fn upsert_club(pool: &DbPool, club: &Club) -> Result<(), StoreError> {
  let document = serde_json::to_string(club)?;

  sqlx::query(
    r#"
    INSERT INTO clubs (id, document, updated_at)
    VALUES (?1, ?2, CURRENT_TIMESTAMP)
    ON CONFLICT(id) DO UPDATE SET
      document = excluded.document,
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(&club.id)
  .bind(document)
  .execute(pool)
  .await?;

  Ok(())
}

pub async fn get_club(pool: &DbPool, id: &str) -> Result<Club, StoreError> {
  let row: Option<(String,)> = sqlx::query_as("SELECT document FROM clubs WHERE id = ?1")
    .bind(id)
    .fetch_optional(pool)
    .await?;

  decode_one(row, "club", id)
}
