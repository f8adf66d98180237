//! Chart data helpers
//!
//! Stateless conversions from derived numbers into the strings, tick
//! sequences and 0..1 geometry fractions the graphs are drawn from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ActivitySample, Event, EventKind};
use crate::stats::{ComparisonMode, DerivedStats};
use crate::zones::{training_period_name, BenchmarkIndicator, IntensityZone, ZoneThresholds};

/// Samples closer than this to the start of a cluster may join it
pub const CLUSTER_WINDOW_SECS: u32 = 9;

const MAX_TICKS: usize = 1_000;
const TICK_EPSILON: f64 = 1e-9;

/// Tick spacing of the speed scale next to the zone bars
pub const SPEED_TICK_KMH: f64 = 5.0;

/// ---------------------------------------------------------------------------
/// Axis
/// ---------------------------------------------------------------------------

/// Ticks `0, step, 2*step, ...` up to the first one at or above `max`
pub fn y_axis_ticks(max: f64, step: f64) -> Vec<f64> {
  if !max.is_finite() || max <= 0.0 {
    return vec![0.0];
  }
  if !step.is_finite() || step <= 0.0 {
    return vec![0.0, max];
  }

  // max / step is off by an ulp for steps like 0.3
  let count = (max / step - TICK_EPSILON).ceil();
  if count > MAX_TICKS as f64 {
    return vec![0.0, max];
  }

  let mut ticks: Vec<f64> = (0..=(count as usize).max(1)).map(|i| step * i as f64).collect();
  if let Some(last) = ticks.last_mut() {
    if *last < max {
      *last = max;
    }
  }
  ticks
}

/// Position of `value` on an axis ending at `axis_max`, clamped to 0..=1
pub fn threshold_fraction(value: f64, axis_max: f64) -> f64 {
  if !axis_max.is_finite() || axis_max <= 0.0 || !value.is_finite() {
    return 0.0;
  }
  (value / axis_max).clamp(0.0, 1.0)
}

/// ---------------------------------------------------------------------------
/// Activity Clusters
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCluster {
  pub start: u32,
  pub end: u32,
  pub value: f64,
  pub samples: usize,
}

/// Merge consecutive samples of equal value that fall within `window_secs`
/// of the current cluster's first sample.
pub fn cluster_activity(samples: &[ActivitySample], window_secs: u32) -> Vec<ActivityCluster> {
  let mut clusters: Vec<ActivityCluster> = Vec::new();

  for sample in samples {
    match clusters.last_mut() {
      Some(current)
        if current.value == sample.value && sample.time.saturating_sub(current.start) < window_secs =>
      {
        current.end = sample.time;
        current.samples += 1;
      }
      _ => clusters.push(ActivityCluster {
        start: sample.time,
        end: sample.time,
        value: sample.value,
        samples: 1,
      }),
    }
  }

  clusters
}

/// ---------------------------------------------------------------------------
/// Labels
/// ---------------------------------------------------------------------------

/// `+2` / `-2` / `MD` for match-day offsets, `NC` / `IT` for categories
pub fn indicator_label(indicator: Option<BenchmarkIndicator>) -> String {
  match indicator {
    None => String::new(),
    Some(BenchmarkIndicator::MatchDayOffset(0)) => "MD".to_string(),
    Some(BenchmarkIndicator::MatchDayOffset(offset)) if offset > 0 => format!("+{}", offset),
    Some(BenchmarkIndicator::MatchDayOffset(offset)) => offset.to_string(),
    Some(BenchmarkIndicator::Category(category)) => category.abbreviation().to_string(),
  }
}

/// Period name for match-day-relative trainings
pub fn period_label(indicator: Option<BenchmarkIndicator>) -> Option<&'static str> {
  match indicator? {
    BenchmarkIndicator::MatchDayOffset(offset) => Some(training_period_name(offset)),
    BenchmarkIndicator::Category(_) => None,
  }
}

/// Name of whatever the denominator is for this mode and event kind
pub fn reference_label(mode: ComparisonMode, kind: EventKind) -> Option<&'static str> {
  match mode {
    ComparisonMode::DontCompare => None,
    ComparisonMode::BestMatch => Some("Best match"),
    ComparisonMode::LastWeek => Some("Last week"),
    ComparisonMode::Last4Weeks => Some("Last 4 weeks"),
    ComparisonMode::SelectedWeek => Some("Selected week"),
    ComparisonMode::Benchmark => match kind {
      EventKind::Match => Some("Best match"),
      EventKind::Training => Some("Benchmark"),
    },
  }
}

pub fn chart_subtitle(mode: ComparisonMode, kind: EventKind) -> String {
  match reference_label(mode, kind) {
    None => "Absolute load".to_string(),
    Some(label) => format!("Compared to {}", label.to_lowercase()),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegendMarker {
  Bar,
  Line,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
  pub label: String,
  pub marker: LegendMarker,
}

pub fn legend_entries(mode: ComparisonMode, kind: EventKind) -> Vec<LegendEntry> {
  let mut entries = vec![LegendEntry {
    label: "Load".to_string(),
    marker: LegendMarker::Bar,
  }];
  if let Some(label) = reference_label(mode, kind) {
    entries.push(LegendEntry {
      label: label.to_string(),
      marker: LegendMarker::Line,
    });
  }
  entries
}

pub fn format_percentage(value: i64) -> String {
  format!("{}%", value)
}

/// e.g. `Mon 4 Mar`
pub fn format_session_date(date: DateTime<Utc>) -> String {
  date.format("%a %-d %b").to_string()
}

/// ---------------------------------------------------------------------------
/// Zone Bars
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBar {
  pub zone: IntensityZone,
  pub label: String,
  pub seconds: f64,
  pub percentage: f64,
  /// Bar height relative to the largest zone
  pub fraction: f64,
}

pub fn zone_bars(stats: &DerivedStats) -> Vec<ZoneBar> {
  let largest = stats
    .intensity_zones
    .iter()
    .map(|(_, v)| v)
    .fold(0.0_f64, f64::max);

  stats
    .intensity_zones
    .iter()
    .map(|(zone, seconds)| ZoneBar {
      zone,
      label: zone.label().to_string(),
      seconds,
      percentage: stats.zone_percentages.get(zone),
      fraction: threshold_fraction(seconds, largest),
    })
    .collect()
}

/// Lower speed bound of a zone drawn across the speed scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdLine {
  pub zone: IntensityZone,
  pub label: String,
  pub speed_kmh: f64,
  pub fraction: f64,
}

/// One line per zone above `Low`, hardest first
pub fn threshold_lines(thresholds: &ZoneThresholds, axis_max: f64) -> Vec<ThresholdLine> {
  IntensityZone::ALL
    .into_iter()
    .filter(|zone| *zone != IntensityZone::Low)
    .map(|zone| {
      let speed_kmh = thresholds.lower_bound(zone);
      ThresholdLine {
        zone,
        label: format!("{} {} km/h", zone.label(), speed_kmh),
        speed_kmh,
        fraction: threshold_fraction(speed_kmh, axis_max),
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Event Chart
/// ---------------------------------------------------------------------------

/// Everything needed to draw one event's load graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChart {
  pub title: String,
  pub subtitle: String,
  pub indicator: String,
  pub period: Option<String>,
  pub legend: Vec<LegendEntry>,
  pub value_label: String,
  pub y_axis: Vec<f64>,
  /// Height of the plotted value as a fraction of the axis
  pub value_fraction: f64,
  /// Height of the reference line, absent when not comparing
  pub reference_fraction: Option<f64>,
  pub zones: Vec<ZoneBar>,
  /// Speed scale for the zone thresholds, in km/h
  pub speed_axis: Vec<f64>,
  pub zone_thresholds: Vec<ThresholdLine>,
  pub activity: Vec<ActivityCluster>,
}

impl EventChart {
  /// When comparing, the value is a percentage and the reference line sits at
  /// 100; otherwise the raw load is plotted.
  pub fn build(
    event: &Event,
    stats: &DerivedStats,
    mode: ComparisonMode,
    thresholds: &ZoneThresholds,
    tick_step: f64,
    cluster_window: u32,
  ) -> Self {
    let comparing = mode != ComparisonMode::DontCompare && stats.has_benchmark;
    let value = stats.percentage_load as f64;
    let reference = if comparing { Some(100.0) } else { None };

    let axis_max = value.max(reference.unwrap_or(0.0));
    let y_axis = y_axis_ticks(axis_max, tick_step);
    let top = y_axis.last().copied().unwrap_or(0.0);

    let speed_axis = y_axis_ticks(thresholds.explosive, SPEED_TICK_KMH);
    let speed_top = speed_axis.last().copied().unwrap_or(0.0);

    Self {
      title: format_session_date(event.start_time),
      subtitle: chart_subtitle(mode, event.kind),
      indicator: indicator_label(event.indicator()),
      period: period_label(event.indicator()).map(str::to_string),
      legend: legend_entries(mode, event.kind),
      value_label: if comparing {
        format_percentage(stats.percentage_load)
      } else {
        stats.load.to_string()
      },
      value_fraction: threshold_fraction(value, top),
      reference_fraction: reference.map(|r| threshold_fraction(r, top)),
      y_axis,
      zones: zone_bars(stats),
      zone_thresholds: threshold_lines(thresholds, speed_top),
      speed_axis,
      activity: cluster_activity(&stats.activity, cluster_window),
    }
  }
}
