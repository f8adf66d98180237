//! Per-event commands: stats, player list, chart and history

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{find_event, load_best_match, load_club};
use crate::aggregate::{collect_past_sessions, generate_player_list_data, PlayerListRow, PlayerSort};
use crate::charts::{indicator_label, EventChart};
use crate::db::{self, AppState, StoreError};
use crate::models::EventKind;
use crate::stats::{ComparisonMode, DerivedStats, StatsQuery};

/// ---------------------------------------------------------------------------
/// Event Stats
/// ---------------------------------------------------------------------------

pub async fn get_event_stats(
  state: &AppState,
  event_id: &str,
  query: &StatsQuery,
) -> Result<DerivedStats, StoreError> {
  let event = find_event(state, event_id).await?;
  let best_match = load_best_match(state).await?;

  Ok(DerivedStats::derive(event.as_ref(), query, best_match.as_ref()))
}

pub async fn get_player_list(
  state: &AppState,
  event_id: &str,
  mode: ComparisonMode,
  sort: PlayerSort,
) -> Result<Vec<PlayerListRow>, StoreError> {
  let event = find_event(state, event_id).await?;
  let players = db::list_players(&state.db).await?;
  let best_match = load_best_match(state).await?;

  Ok(generate_player_list_data(
    event.as_ref(),
    &players,
    mode,
    sort,
    best_match.as_ref(),
  ))
}

/// Chart for an event; `None` when the event is not cached.
///
/// Zone thresholds follow the configured club's sport and gender.
pub async fn get_event_chart(
  state: &AppState,
  event_id: &str,
  query: &StatsQuery,
  tick_step: f64,
) -> Result<Option<EventChart>, StoreError> {
  let Some(event) = find_event(state, event_id).await? else {
    return Ok(None);
  };
  let club = load_club(state).await?;
  let best_match = club.as_ref().map(|c| &c.best_match);
  let thresholds = club.as_ref().map(|c| c.thresholds()).unwrap_or_default();

  let stats = DerivedStats::derive(Some(&event), query, best_match);
  Ok(Some(EventChart::build(
    &event,
    &stats,
    query.mode,
    &thresholds,
    tick_step,
    state.config.cluster_window_secs,
  )))
}

/// ---------------------------------------------------------------------------
/// Past Sessions
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PastSession {
  pub event_id: String,
  pub kind: EventKind,
  pub date: DateTime<Utc>,
  pub indicator: String,
  pub load: i64,
  pub percentage_load: i64,
  pub has_benchmark: bool,
}

/// The target session and the ones before it, oldest first
pub async fn get_past_sessions(
  state: &AppState,
  event_id: &str,
  query: &StatsQuery,
) -> Result<Vec<PastSession>, StoreError> {
  let events = db::list_events(&state.db).await?;
  let best_match = load_best_match(state).await?;

  let sessions = collect_past_sessions(event_id, &events, state.config.past_sessions)
    .into_iter()
    .map(|event| {
      let stats = DerivedStats::derive(Some(event), query, best_match.as_ref());
      PastSession {
        event_id: event.id.clone(),
        kind: event.kind,
        date: event.start_time,
        indicator: indicator_label(event.indicator()),
        load: stats.load,
        percentage_load: stats.percentage_load,
        has_benchmark: stats.has_benchmark,
      }
    })
    .collect();

  Ok(sessions)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::commands::{store_club, store_event, store_player};
  use crate::test_utils::{
    day, mock_best_match, mock_club, mock_match, mock_players, mock_training, setup_test_state,
    with_player, with_player_benchmark, with_team_benchmark,
  };
  use crate::zones::{Gender, Sport, ZoneThresholds};

  #[tokio::test]
  async fn test_event_stats_unknown_event_is_zero() {
    let state = setup_test_state(None).await;

    let stats = get_event_stats(&state, "missing", &StatsQuery::team(ComparisonMode::Benchmark))
      .await
      .unwrap();
    assert_eq!(stats, DerivedStats::default());
  }

  #[tokio::test]
  async fn test_match_stats_use_configured_club() {
    let state = setup_test_state(Some("club-1")).await;
    store_club(&state, mock_club(mock_best_match(300.0))).await.unwrap();
    store_event(&state, mock_match("m1", day(5), 450.0)).await.unwrap();

    let stats = get_event_stats(&state, "m1", &StatsQuery::team(ComparisonMode::Benchmark))
      .await
      .unwrap();
    assert_eq!(stats.comparison_load, 300);
    assert_eq!(stats.percentage_load, 150);
  }

  #[tokio::test]
  async fn test_player_list_from_cache() {
    let state = setup_test_state(None).await;
    for player in mock_players() {
      store_player(&state, player).await.unwrap();
    }
    let event = with_player(with_player(mock_training("t1", day(0), 300.0), "p1", 40.0), "p2", 80.0);
    let event = with_player_benchmark(with_player_benchmark(event, "p1", 80.0), "p2", 80.0);
    store_event(&state, event).await.unwrap();

    let rows = get_player_list(&state, "t1", ComparisonMode::Benchmark, PlayerSort::PercentageDescending)
      .await
      .unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.player_id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p1"]);
    assert_eq!(rows[1].percentage, 50);
    assert!(rows[0].name.is_some());
  }

  #[tokio::test]
  async fn test_event_chart() {
    let state = setup_test_state(None).await;
    store_event(&state, with_team_benchmark(mock_training("t1", day(0), 150.0), 100.0))
      .await
      .unwrap();

    let chart = get_event_chart(&state, "t1", &StatsQuery::team(ComparisonMode::Benchmark), 50.0)
      .await
      .unwrap()
      .expect("Should build chart");
    assert_eq!(chart.value_label, "150%");

    let missing = get_event_chart(&state, "t9", &StatsQuery::team(ComparisonMode::Benchmark), 50.0)
      .await
      .unwrap();
    assert!(missing.is_none());
  }

  #[tokio::test]
  async fn test_event_chart_uses_club_thresholds() {
    let state = setup_test_state(Some("club-1")).await;
    store_event(&state, mock_training("t1", day(0), 150.0)).await.unwrap();

    // Club not cached yet: default table
    let chart = get_event_chart(&state, "t1", &StatsQuery::team(ComparisonMode::DontCompare), 50.0)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(chart.zone_thresholds[0].speed_kmh, ZoneThresholds::default().explosive);

    let mut club = mock_club(mock_best_match(300.0));
    club.sport = Sport::Hockey;
    store_club(&state, club).await.unwrap();

    let chart = get_event_chart(&state, "t1", &StatsQuery::team(ComparisonMode::DontCompare), 50.0)
      .await
      .unwrap()
      .unwrap();
    let expected = ZoneThresholds::for_sport(Sport::Hockey, Gender::Female);
    let speeds: Vec<f64> = chart.zone_thresholds.iter().map(|l| l.speed_kmh).collect();
    assert_eq!(speeds, vec![expected.explosive, expected.very_high, expected.high, expected.moderate]);
  }

  #[tokio::test]
  async fn test_past_sessions_window_from_config() {
    let mut state = setup_test_state(None).await;
    state.config.past_sessions = 3;
    for i in 0..6 {
      store_event(&state, mock_training(&format!("t{}", i), day(i), 10.0 * (i + 1) as f64))
        .await
        .unwrap();
    }

    let sessions = get_past_sessions(&state, "t4", &StatsQuery::team(ComparisonMode::DontCompare))
      .await
      .unwrap();
    let ids: Vec<_> = sessions.iter().map(|s| s.event_id.as_str()).collect();
    assert_eq!(ids, vec!["t2", "t3", "t4"]);
    assert_eq!(sessions[2].load, 50);

    let none = get_past_sessions(&state, "nope", &StatsQuery::team(ComparisonMode::DontCompare))
      .await
      .unwrap();
    assert!(none.is_empty());
  }
}
