//! Per-event stats derivation
//!
//! Turns one event document into display-ready numbers for either the team or
//! a single player, optionally restricted to one drill. The comparison mode
//! decides which reference values act as the denominator.
//!
//! Nothing in here fails: absent event, report, benchmark or player bucket all
//! degrade to zeros.

use serde::{Deserialize, Serialize};

use crate::models::{ActivitySample, BenchmarkValues, BestMatch, Event, EventKind, Measurements};
use crate::zones::IntensityZones;

/// ---------------------------------------------------------------------------
/// Comparison Mode
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonMode {
  DontCompare,
  Benchmark,
  BestMatch,
  LastWeek,
  #[serde(rename = "last4Weeks")]
  Last4Weeks,
  SelectedWeek,
}

impl ComparisonMode {
  /// Modes whose denominator is another week rather than a reference session
  pub fn is_week_comparison(&self) -> bool {
    matches!(
      self,
      ComparisonMode::LastWeek | ComparisonMode::Last4Weeks | ComparisonMode::SelectedWeek
    )
  }
}

/// `round(numerator / (denominator || 1) * factor)` where the factor is 100
/// only for denominators above one.
///
/// Denominators in `(0, 1]` therefore yield the plain ratio rather than a
/// percentage. The jump at exactly 1 is kept as observed.
pub fn percentage(numerator: f64, denominator: f64) -> i64 {
  let factor = if denominator > 1.0 { 100.0 } else { 1.0 };
  let divisor = if denominator == 0.0 || denominator.is_nan() {
    1.0
  } else {
    denominator
  };
  round_display(numerator / divisor * factor)
}

/// Round for display; non-finite values collapse to zero
pub fn round_display(value: f64) -> i64 {
  if value.is_finite() {
    value.round() as i64
  } else {
    0
  }
}

fn round_zones(zones: &IntensityZones) -> IntensityZones {
  zones.map(|_, v| round_display(v) as f64)
}

impl Measurements {
  pub fn load_per_minute(&self) -> f64 {
    if self.minutes > 0.0 {
      self.load / self.minutes
    } else {
      0.0
    }
  }
}

impl BenchmarkValues {
  /// Recorded load per minute, or load / minutes when it was never stored
  pub fn effective_load_per_minute(&self) -> f64 {
    if self.load_per_minute > 0.0 {
      self.load_per_minute
    } else if self.minutes > 0.0 {
      self.load / self.minutes
    } else {
      0.0
    }
  }
}

/// ---------------------------------------------------------------------------
/// Query
/// ---------------------------------------------------------------------------

/// Which slice of an event to derive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
  /// `None` selects the team bucket
  pub player_id: Option<String>,
  pub mode: ComparisonMode,
  /// Unknown ids fall back to the full session
  pub sub_session: Option<String>,
}

impl StatsQuery {
  pub fn team(mode: ComparisonMode) -> Self {
    Self {
      player_id: None,
      mode,
      sub_session: None,
    }
  }

  pub fn player(player_id: impl Into<String>, mode: ComparisonMode) -> Self {
    Self {
      player_id: Some(player_id.into()),
      mode,
      sub_session: None,
    }
  }

  pub fn in_sub_session(mut self, sub_session: impl Into<String>) -> Self {
    self.sub_session = Some(sub_session.into());
    self
  }
}

/// ---------------------------------------------------------------------------
/// Derived Stats
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
  pub load: i64,
  pub comparison_load: i64,
  /// Percentage of the comparison load, or the raw load when not comparing
  pub percentage_load: i64,
  pub minutes: i64,

  pub load_per_minute: f64,
  pub comparison_load_per_minute: f64,
  /// load_per_minute / comparison_load_per_minute, zero without reference
  pub load_per_minute_ratio: f64,

  /// Seconds per zone
  pub intensity_zones: IntensityZones,
  pub comparison_zones: IntensityZones,
  pub zone_percentages: IntensityZones,

  pub actions: IntensityZones,
  pub total_actions: i64,
  pub activity: Vec<ActivitySample>,

  /// False when a comparison was requested but no reference exists
  pub has_benchmark: bool,
}

impl DerivedStats {
  /// Derive stats for one event slice.
  ///
  /// `best_match` is the club's best-match record; it is the denominator for
  /// matches and for an explicit `BestMatch` comparison.
  pub fn derive(event: Option<&Event>, query: &StatsQuery, best_match: Option<&BestMatch>) -> Self {
    let Some(event) = event else {
      return Self::default();
    };

    let player_id = query.player_id.as_deref();
    let empty = Measurements::default();

    let set = event.stats().and_then(|stats| match player_id {
      Some(id) => stats.players.get(id),
      None => Some(&stats.team),
    });
    let full = set.map(|s| &s.full).unwrap_or(&empty);

    let sub_session = query.sub_session.as_deref().and_then(|id| event.sub_session(id));

    let (measurements, activity) = match sub_session {
      Some(sub) => {
        let drill = set.and_then(|s| s.drills.get(&sub.id)).unwrap_or(&empty);
        let activity = full
          .activity
          .iter()
          .filter(|sample| sub.contains(sample.time))
          .copied()
          .collect();
        (drill, activity)
      }
      None => (full, full.activity.clone()),
    };

    let load = measurements.load;
    let load_per_minute = measurements.load_per_minute();

    let mut stats = Self {
      load: round_display(load),
      minutes: round_display(measurements.minutes),
      load_per_minute,
      intensity_zones: round_zones(&measurements.intensity_zones),
      actions: round_zones(&measurements.actions),
      total_actions: round_display(measurements.actions.total()),
      activity,
      ..Self::default()
    };

    if query.mode == ComparisonMode::DontCompare {
      stats.percentage_load = round_display(load);
      stats.zone_percentages = round_zones(&measurements.intensity_zones);
      stats.has_benchmark = true;
      return stats;
    }

    let reference = comparison_source(event, query.mode, player_id, best_match);

    // Reference values describe a whole session; a drill compares against the
    // share of it matching the drill's duration.
    let prorate = match (sub_session, reference) {
      (None, _) => 1.0,
      (Some(_), Some(r)) if r.minutes > 0.0 => measurements.minutes / r.minutes,
      (Some(_), _) => 0.0,
    };

    let comparison_load = reference.map(|r| r.load * prorate).unwrap_or(0.0);
    let comparison_zones = reference
      .map(|r| r.intensity_zones.scale(prorate))
      .unwrap_or_default();
    let comparison_load_per_minute = reference
      .map(|r| r.effective_load_per_minute())
      .unwrap_or(0.0);

    stats.comparison_load = round_display(comparison_load);
    stats.percentage_load = percentage(load, comparison_load);
    stats.comparison_zones = round_zones(&comparison_zones);
    stats.zone_percentages = measurements
      .intensity_zones
      .zip_with(&comparison_zones, |value, reference| percentage(value, reference) as f64);
    stats.comparison_load_per_minute = comparison_load_per_minute;
    stats.load_per_minute_ratio = if comparison_load_per_minute > 0.0 {
      load_per_minute / comparison_load_per_minute
    } else {
      0.0
    };
    stats.has_benchmark = comparison_load > 0.0;

    stats
  }
}

/// Pick the reference values acting as denominator
fn comparison_source<'a>(
  event: &'a Event,
  mode: ComparisonMode,
  player_id: Option<&str>,
  best_match: Option<&'a BestMatch>,
) -> Option<&'a BenchmarkValues> {
  match mode {
    ComparisonMode::DontCompare => None,
    ComparisonMode::BestMatch => best_match?.for_scope(player_id),
    _ if event.kind == EventKind::Match => best_match?.for_scope(player_id),
    _ => event.benchmark.as_ref()?.for_scope(player_id),
  }
}
