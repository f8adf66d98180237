//! Cross-event aggregation
//!
//! Folds many events into weekly team and player summaries, leaderboards and
//! rolling load ratios. Callers hand in events sorted by `start_time`; the
//! functions here keep input order wherever order is observable.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{BestMatch, Event, EventKind, Player, Position};
use crate::stats::{percentage, ComparisonMode, DerivedStats, StatsQuery};
use crate::zones::{BenchmarkIndicator, IntensityZones};

/// Default number of sessions returned by [`collect_past_sessions`]
pub const PAST_SESSIONS_WINDOW: usize = 20;

const ACUTE_WINDOW_DAYS: i64 = 7;
const CHRONIC_WINDOW_DAYS: i64 = 28;

/// ---------------------------------------------------------------------------
/// Week Windows
/// ---------------------------------------------------------------------------

/// Half-open `[start, end)` window of seven days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekWindow {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl WeekWindow {
  /// The week containing `at`, starting at midnight UTC on `week_start`
  pub fn containing(at: DateTime<Utc>, week_start: Weekday) -> Self {
    let date = at.date_naive();
    let offset = (date.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
    let start = (date - Duration::days(offset as i64))
      .and_time(NaiveTime::MIN)
      .and_utc();
    Self {
      start,
      end: start + Duration::days(7),
    }
  }

  /// Window shifted by a whole number of weeks
  pub fn shifted(&self, weeks: i64) -> Self {
    Self {
      start: self.start + Duration::weeks(weeks),
      end: self.end + Duration::weeks(weeks),
    }
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    at >= self.start && at < self.end
  }

  /// Events inside the window, sorted by start time
  pub fn select<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
    let mut selected: Vec<&Event> = events.iter().filter(|e| self.contains(e.start_time)).collect();
    selected.sort_by_key(|e| e.start_time);
    selected
  }
}

/// ---------------------------------------------------------------------------
/// Weekly Aggregation
/// ---------------------------------------------------------------------------

/// One row per event within a week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyOverviewEntry {
  pub event_id: String,
  pub kind: EventKind,
  pub date: DateTime<Utc>,
  pub load: i64,
  pub intensity_zones: IntensityZones,
  pub indicator: Option<BenchmarkIndicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAggregate {
  pub player_id: String,
  pub name: Option<String>,
  pub shirt_number: Option<u32>,
  pub total_load: i64,
  pub zone_totals: IntensityZones,
  pub overview: Vec<WeeklyOverviewEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekAggregate {
  pub total_load: i64,
  pub per_zone_totals: IntensityZones,
  pub per_event_overview: Vec<WeeklyOverviewEntry>,
  pub per_player_aggregates: Vec<PlayerAggregate>,
}

fn overview_entry(event: &Event, stats: &DerivedStats) -> WeeklyOverviewEntry {
  WeeklyOverviewEntry {
    event_id: event.id.clone(),
    kind: event.kind,
    date: event.start_time,
    load: stats.load,
    intensity_zones: stats.intensity_zones,
    indicator: event.indicator(),
  }
}

/// Fold events into team totals, one overview row per event and one
/// aggregate per rostered or reporting player.
///
/// Player aggregates appear in order of first occurrence.
pub fn aggregate_week<'a, I>(events: I, players: &[Player]) -> WeekAggregate
where
  I: IntoIterator<Item = &'a Event>,
{
  let mut aggregate = WeekAggregate::default();
  let mut player_index: HashMap<String, usize> = HashMap::new();

  for event in events {
    let team = DerivedStats::derive(Some(event), &StatsQuery::team(ComparisonMode::DontCompare), None);
    aggregate.total_load += team.load;
    aggregate.per_zone_totals += team.intensity_zones;
    aggregate.per_event_overview.push(overview_entry(event, &team));

    for player_id in event.participant_ids() {
      let query = StatsQuery::player(player_id.as_str(), ComparisonMode::DontCompare);
      let stats = DerivedStats::derive(Some(event), &query, None);
      let row = overview_entry(event, &stats);

      match player_index.get(&player_id) {
        Some(&idx) => {
          let record = &mut aggregate.per_player_aggregates[idx];
          record.total_load += stats.load;
          record.zone_totals += stats.intensity_zones;
          record.overview.push(row);
        }
        None => {
          let player = Player::find(players, &player_id);
          player_index.insert(player_id.clone(), aggregate.per_player_aggregates.len());
          aggregate.per_player_aggregates.push(PlayerAggregate {
            player_id,
            name: player.map(|p| p.name.clone()),
            shirt_number: player.and_then(|p| p.shirt_number),
            total_load: stats.load,
            zone_totals: stats.intensity_zones,
            overview: vec![row],
          });
        }
      }
    }
  }

  tracing::debug!(
    events = aggregate.per_event_overview.len(),
    players = aggregate.per_player_aggregates.len(),
    total_load = aggregate.total_load,
    "aggregated week"
  );

  aggregate
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyLoad {
  pub window: WeekWindow,
  pub aggregate: WeekAggregate,
}

/// Aggregate the week containing `reference`
pub fn weekly_load_data(
  events: &[Event],
  players: &[Player],
  reference: DateTime<Utc>,
  week_start: Weekday,
) -> WeeklyLoad {
  let window = WeekWindow::containing(reference, week_start);
  let aggregate = aggregate_week(window.select(events), players);
  WeeklyLoad { window, aggregate }
}

/// ---------------------------------------------------------------------------
/// Week vs Week Comparison
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekComparison {
  pub current_load: i64,
  pub reference_load: i64,
  pub percentage: i64,
  pub has_reference: bool,
}

/// Team load over a window
pub fn week_team_load(events: &[Event], window: WeekWindow) -> i64 {
  window
    .select(events)
    .into_iter()
    .map(|e| DerivedStats::derive(Some(e), &StatsQuery::team(ComparisonMode::DontCompare), None).load)
    .sum()
}

/// Compare the load of `window` against the week(s) named by `mode`.
///
/// Non-week modes have no reference; the percentage then degrades to the raw
/// load like any other missing denominator.
pub fn compare_weeks(
  events: &[Event],
  window: WeekWindow,
  mode: ComparisonMode,
  selected: Option<WeekWindow>,
) -> WeekComparison {
  let current_load = week_team_load(events, window);

  let reference = if mode.is_week_comparison() {
    match mode {
      ComparisonMode::LastWeek => week_team_load(events, window.shifted(-1)) as f64,
      ComparisonMode::Last4Weeks => {
        let sum: i64 = (1..=4).map(|w| week_team_load(events, window.shifted(-w))).sum();
        sum as f64 / 4.0
      }
      _ => selected
        .map(|w| week_team_load(events, w) as f64)
        .unwrap_or(0.0),
    }
  } else {
    tracing::debug!(?mode, "not a week comparison, no reference week");
    0.0
  };

  WeekComparison {
    current_load,
    reference_load: reference.round() as i64,
    percentage: percentage(current_load as f64, reference),
    has_reference: reference > 0.0,
  }
}

/// ---------------------------------------------------------------------------
/// Past Sessions
/// ---------------------------------------------------------------------------

/// Up to `window` events ending with (and including) the target.
///
/// `events` must be in chronological order. Returns just the target when it
/// is the first event and nothing when it is absent.
pub fn collect_past_sessions<'a>(target_id: &str, events: &'a [Event], window: usize) -> Vec<&'a Event> {
  let Some(idx) = events.iter().position(|e| e.id == target_id) else {
    return Vec::new();
  };
  let start = (idx + 1).saturating_sub(window.max(1));
  events[start..=idx].iter().collect()
}

/// ---------------------------------------------------------------------------
/// Acute / Chronic Ratio
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskBand {
  NoData,
  Undertrained,
  Optimal,
  Caution,
  HighRisk,
}

impl RiskBand {
  pub fn from_ratio(ratio: f64) -> Self {
    match ratio {
      r if r <= 0.0 || !r.is_finite() => RiskBand::NoData,
      r if r < 0.8 => RiskBand::Undertrained,
      r if r <= 1.3 => RiskBand::Optimal,
      r if r <= 1.5 => RiskBand::Caution,
      _ => RiskBand::HighRisk,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcuteChronic {
  /// Daily average over the acute window
  pub acute_load: f64,
  /// Daily average over the chronic window
  pub chronic_load: f64,
  pub ratio: f64,
  pub band: RiskBand,
}

fn scope_load(event: &Event, player_id: Option<&str>) -> f64 {
  event
    .stats()
    .and_then(|stats| match player_id {
      Some(id) => stats.players.get(id),
      None => Some(&stats.team),
    })
    .map(|set| set.full.load)
    .unwrap_or(0.0)
}

/// Acute (7 day) over chronic (28 day) daily load for the team or a player.
///
/// Each window is divided by the days elapsed since the first finished event,
/// capped at the window length, so early-season ratios are not diluted by days
/// before any data existed.
pub fn acute_chronic_ratio(events: &[Event], player_id: Option<&str>, reference: DateTime<Utc>) -> AcuteChronic {
  let finished: Vec<&Event> = events
    .iter()
    .filter(|e| e.finished && e.start_time <= reference)
    .collect();

  let Some(first) = finished.iter().map(|e| e.start_time).min() else {
    return AcuteChronic {
      acute_load: 0.0,
      chronic_load: 0.0,
      ratio: 0.0,
      band: RiskBand::NoData,
    };
  };

  let elapsed_days = (reference.date_naive() - first.date_naive()).num_days() + 1;

  let window_sum = |days: i64| -> f64 {
    let from = reference - Duration::days(days);
    finished
      .iter()
      .filter(|e| e.start_time > from)
      .map(|e| scope_load(e, player_id))
      .sum()
  };

  let acute_load = window_sum(ACUTE_WINDOW_DAYS) / elapsed_days.clamp(1, ACUTE_WINDOW_DAYS) as f64;
  let chronic_load = window_sum(CHRONIC_WINDOW_DAYS) / elapsed_days.clamp(1, CHRONIC_WINDOW_DAYS) as f64;

  let ratio = if acute_load == 0.0 || chronic_load == 0.0 {
    0.0
  } else {
    acute_load / chronic_load
  };

  AcuteChronic {
    acute_load,
    chronic_load,
    ratio,
    band: RiskBand::from_ratio(ratio),
  }
}

/// ---------------------------------------------------------------------------
/// Player List
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerSort {
  /// Highest first, players without benchmark at the bottom
  PercentageDescending,
  /// Lowest first, players without benchmark at the top
  PercentageAscending,
  /// Lowest first, players without benchmark at the bottom
  AscendingMissingLast,
}

/// Sort rank of a row; a missing benchmark is never compared numerically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkRank {
  Missing,
  HasValue(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerListRow {
  pub player_id: String,
  pub name: Option<String>,
  pub shirt_number: Option<u32>,
  pub position: Option<Position>,
  pub load: i64,
  pub minutes: i64,
  pub percentage: i64,
  pub is_no_benchmark: bool,
}

impl PlayerListRow {
  pub fn rank(&self) -> BenchmarkRank {
    if self.is_no_benchmark {
      BenchmarkRank::Missing
    } else {
      BenchmarkRank::HasValue(self.percentage)
    }
  }
}

impl PlayerSort {
  pub fn compare(&self, a: &PlayerListRow, b: &PlayerListRow) -> Ordering {
    let missing_first = *self == PlayerSort::PercentageAscending;
    match (a.rank(), b.rank()) {
      (BenchmarkRank::HasValue(x), BenchmarkRank::HasValue(y)) => match self {
        PlayerSort::PercentageDescending => y.cmp(&x),
        PlayerSort::PercentageAscending | PlayerSort::AscendingMissingLast => x.cmp(&y),
      },
      (BenchmarkRank::Missing, BenchmarkRank::Missing) => Ordering::Equal,
      (BenchmarkRank::Missing, BenchmarkRank::HasValue(_)) => {
        if missing_first {
          Ordering::Less
        } else {
          Ordering::Greater
        }
      }
      (BenchmarkRank::HasValue(_), BenchmarkRank::Missing) => {
        if missing_first {
          Ordering::Greater
        } else {
          Ordering::Less
        }
      }
    }
  }
}

/// One row per participant of `event`, sorted by `sort`. Ties keep roster order.
pub fn generate_player_list_data(
  event: Option<&Event>,
  players: &[Player],
  mode: ComparisonMode,
  sort: PlayerSort,
  best_match: Option<&BestMatch>,
) -> Vec<PlayerListRow> {
  let Some(event) = event else {
    return Vec::new();
  };

  let mut rows: Vec<PlayerListRow> = event
    .participant_ids()
    .into_iter()
    .map(|player_id| {
      let stats = DerivedStats::derive(Some(event), &StatsQuery::player(player_id.as_str(), mode), best_match);
      let player = Player::find(players, &player_id);
      PlayerListRow {
        name: player.map(|p| p.name.clone()),
        shirt_number: player.and_then(|p| p.shirt_number),
        position: player.and_then(|p| p.position),
        load: stats.load,
        minutes: stats.minutes,
        percentage: stats.percentage_load,
        is_no_benchmark: !stats.has_benchmark,
        player_id,
      }
    })
    .collect();

  rows.sort_by(|a, b| sort.compare(a, b));
  rows
}
