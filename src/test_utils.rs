//! Test utilities and helpers for unit and command testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Event, player and club factories
//! - Helper assertions

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::AppState;
use crate::models::{
  ActivitySample, BenchmarkValues, BestMatch, Club, Event, EventKind, MeasurementSet, Measurements,
  Player, Position, Preparation, Report, ReportStats, SubSession,
};
use crate::zones::{BenchmarkIndicator, Gender, IntensityZones, Sport};

/// Session length used by every factory
pub const SESSION_MINUTES: f64 = 90.0;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// App state over a fresh in-memory database
pub async fn setup_test_state(club_id: Option<&str>) -> AppState {
  AppState {
    db: setup_test_db().await,
    config: Config {
      club_id: club_id.map(str::to_string),
      ..Config::default()
    },
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Monday 2024-03-04 10:00 UTC shifted by `offset` days
pub fn day(offset: i64) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap() + Duration::days(offset)
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Zone seconds proportional to load, largest in the low zone
pub fn mock_zones(load: f64) -> IntensityZones {
  IntensityZones {
    explosive: load * 0.05,
    very_high: load * 0.1,
    high: load * 0.2,
    moderate: load * 0.3,
    low: load * 0.35,
  }
}

/// One sample per minute for a whole session
pub fn mock_activity() -> Vec<ActivitySample> {
  (0..SESSION_MINUTES as u32)
    .map(|minute| ActivitySample {
      time: minute * 60,
      value: (minute % 5) as f64,
    })
    .collect()
}

pub fn mock_measurements(load: f64, minutes: f64) -> Measurements {
  Measurements {
    load,
    minutes,
    intensity_zones: mock_zones(load),
    actions: mock_zones(load / 10.0),
    activity: Vec::new(),
  }
}

pub fn mock_benchmark_values(load: f64) -> BenchmarkValues {
  BenchmarkValues {
    load,
    minutes: SESSION_MINUTES,
    load_per_minute: 0.0,
    intensity_zones: mock_zones(load),
  }
}

fn mock_event(id: &str, kind: EventKind, start_time: DateTime<Utc>, team_load: f64) -> Event {
  let mut full = mock_measurements(team_load, SESSION_MINUTES);
  full.activity = mock_activity();

  Event {
    id: id.to_string(),
    kind,
    start_time,
    end_time: Some(start_time + Duration::minutes(SESSION_MINUTES as i64)),
    finished: true,
    report: Some(Report {
      stats: Some(ReportStats {
        team: MeasurementSet {
          full,
          ..MeasurementSet::default()
        },
        ..ReportStats::default()
      }),
    }),
    benchmark: None,
    preparation: Preparation::default(),
    sub_sessions: Vec::new(),
  }
}

/// Finished training with team stats and no benchmark
pub fn mock_training(id: &str, start_time: DateTime<Utc>, team_load: f64) -> Event {
  mock_event(id, EventKind::Training, start_time, team_load)
}

/// Finished match with team stats
pub fn mock_match(id: &str, start_time: DateTime<Utc>, team_load: f64) -> Event {
  let mut event = mock_event(id, EventKind::Match, start_time, team_load);
  event.benchmark = Some(crate::models::Benchmark {
    indicator: Some(BenchmarkIndicator::MatchDayOffset(0)),
    ..Default::default()
  });
  event
}

fn stats_mut(event: &mut Event) -> &mut ReportStats {
  event
    .report
    .get_or_insert_with(Report::default)
    .stats
    .get_or_insert_with(ReportStats::default)
}

/// Roster the player and record their full-session stats
pub fn with_player(mut event: Event, player_id: &str, load: f64) -> Event {
  event.preparation.roster.push(player_id.to_string());
  stats_mut(&mut event).players.insert(
    player_id.to_string(),
    MeasurementSet {
      full: mock_measurements(load, SESSION_MINUTES),
      ..MeasurementSet::default()
    },
  );
  event
}

pub fn with_team_benchmark(mut event: Event, load: f64) -> Event {
  event.benchmark.get_or_insert_with(Default::default).team = Some(mock_benchmark_values(load));
  event
}

pub fn with_player_benchmark(mut event: Event, player_id: &str, load: f64) -> Event {
  event
    .benchmark
    .get_or_insert_with(Default::default)
    .players
    .insert(player_id.to_string(), mock_benchmark_values(load));
  event
}

/// Add a drill with its own team measurements
pub fn with_sub_session(mut event: Event, id: &str, start: u32, end: u32, load: f64, minutes: f64) -> Event {
  event.sub_sessions.push(SubSession {
    id: id.to_string(),
    name: format!("Drill {}", id),
    start_seconds: start,
    end_seconds: end,
  });
  stats_mut(&mut event)
    .team
    .drills
    .insert(id.to_string(), mock_measurements(load, minutes));
  event
}

pub fn mock_players() -> Vec<Player> {
  vec![
    Player {
      id: "p1".to_string(),
      name: "Alex Morgan".to_string(),
      shirt_number: Some(9),
      position: Some(Position::Forward),
    },
    Player {
      id: "p2".to_string(),
      name: "Sam Kerr".to_string(),
      shirt_number: Some(20),
      position: Some(Position::Forward),
    },
    Player {
      id: "p3".to_string(),
      name: "Lucy Bronze".to_string(),
      shirt_number: Some(2),
      position: Some(Position::Defender),
    },
    Player {
      id: "p4".to_string(),
      name: "Mary Earps".to_string(),
      shirt_number: Some(1),
      position: Some(Position::Goalkeeper),
    },
  ]
}

pub fn mock_best_match(team_load: f64) -> BestMatch {
  BestMatch {
    team: Some(mock_benchmark_values(team_load)),
    ..BestMatch::default()
  }
}

pub fn mock_club(best_match: BestMatch) -> Club {
  Club {
    id: "club-1".to_string(),
    name: "Test FC".to_string(),
    sport: Sport::Football,
    gender: Gender::Female,
    best_match,
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('events', 'players', 'clubs')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 3, "Expected 3 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_factories_build_consistent_events() {
    let event = with_player(mock_training("t1", day(0), 100.0), "p1", 40.0);
    let stats = event.stats().expect("Should have stats");

    assert_eq!(stats.team.full.load, 100.0);
    assert_eq!(stats.team.full.activity.len(), 90);
    assert_eq!(stats.players["p1"].full.load, 40.0);
    assert_eq!(event.preparation.roster, vec!["p1"]);
    assert!(event.finished);
  }

  #[test]
  fn test_day_helper_starts_on_monday() {
    use chrono::{Datelike, Weekday};
    assert_eq!(day(0).weekday(), Weekday::Mon);
    assert_eq!(day(7) - day(0), Duration::days(7));
  }
}
