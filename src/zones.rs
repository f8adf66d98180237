//! Static zone and threshold tables
//!
//! Intensity zones are a closed set of five buckets. Everything that stores a
//! per-zone value goes through [`IntensityZones`] and is indexed with
//! [`IntensityZone`], so a missing key is always a zero and never a lookup miss.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// ---------------------------------------------------------------------------
/// Intensity Zones
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntensityZone {
  Explosive,
  VeryHigh,
  High,
  Moderate,
  Low,
}

impl IntensityZone {
  /// All zones, hardest first
  pub const ALL: [IntensityZone; 5] = [
    IntensityZone::Explosive,
    IntensityZone::VeryHigh,
    IntensityZone::High,
    IntensityZone::Moderate,
    IntensityZone::Low,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      IntensityZone::Explosive => "Explosive",
      IntensityZone::VeryHigh => "Very high",
      IntensityZone::High => "High",
      IntensityZone::Moderate => "Moderate",
      IntensityZone::Low => "Low",
    }
  }
}

/// Per-zone values (seconds spent, action counts or percentages)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntensityZones {
  pub explosive: f64,
  pub very_high: f64,
  pub high: f64,
  pub moderate: f64,
  pub low: f64,
}

impl IntensityZones {
  pub fn get(&self, zone: IntensityZone) -> f64 {
    match zone {
      IntensityZone::Explosive => self.explosive,
      IntensityZone::VeryHigh => self.very_high,
      IntensityZone::High => self.high,
      IntensityZone::Moderate => self.moderate,
      IntensityZone::Low => self.low,
    }
  }

  pub fn set(&mut self, zone: IntensityZone, value: f64) {
    match zone {
      IntensityZone::Explosive => self.explosive = value,
      IntensityZone::VeryHigh => self.very_high = value,
      IntensityZone::High => self.high = value,
      IntensityZone::Moderate => self.moderate = value,
      IntensityZone::Low => self.low = value,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (IntensityZone, f64)> + '_ {
    IntensityZone::ALL.into_iter().map(move |z| (z, self.get(z)))
  }

  /// Build a new set by applying `f` to every zone
  pub fn map(&self, mut f: impl FnMut(IntensityZone, f64) -> f64) -> Self {
    let mut out = Self::default();
    for (zone, value) in self.iter() {
      out.set(zone, f(zone, value));
    }
    out
  }

  /// Combine two sets zone by zone
  pub fn zip_with(&self, other: &Self, mut f: impl FnMut(f64, f64) -> f64) -> Self {
    self.map(|zone, value| f(value, other.get(zone)))
  }

  pub fn scale(&self, factor: f64) -> Self {
    self.map(|_, v| v * factor)
  }

  pub fn total(&self) -> f64 {
    self.iter().map(|(_, v)| v).sum()
  }
}

impl Add for IntensityZones {
  type Output = IntensityZones;

  fn add(self, rhs: Self) -> Self::Output {
    self.zip_with(&rhs, |a, b| a + b)
  }
}

impl AddAssign for IntensityZones {
  fn add_assign(&mut self, rhs: Self) {
    *self = *self + rhs;
  }
}

/// ---------------------------------------------------------------------------
/// Per-sport / per-gender speed thresholds
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sport {
  #[default]
  Football,
  Hockey,
  Handball,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
  #[default]
  Male,
  Female,
}

/// Lower bounds (km/h) of each zone above `Low`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneThresholds {
  pub explosive: f64,
  pub very_high: f64,
  pub high: f64,
  pub moderate: f64,
}

impl Default for ZoneThresholds {
  fn default() -> Self {
    Self::for_sport(Sport::default(), Gender::default())
  }
}

impl ZoneThresholds {
  pub fn for_sport(sport: Sport, gender: Gender) -> Self {
    let (explosive, very_high, high, moderate) = match (sport, gender) {
      (Sport::Football, Gender::Male) => (25.2, 19.8, 14.4, 7.2),
      (Sport::Football, Gender::Female) => (22.5, 18.0, 12.6, 6.3),
      (Sport::Hockey, Gender::Male) => (23.0, 19.0, 15.0, 8.0),
      (Sport::Hockey, Gender::Female) => (21.0, 17.0, 13.0, 7.0),
      (Sport::Handball, Gender::Male) => (22.0, 18.0, 14.0, 7.0),
      (Sport::Handball, Gender::Female) => (20.0, 16.0, 12.5, 6.5),
    };
    Self {
      explosive,
      very_high,
      high,
      moderate,
    }
  }

  pub fn classify(&self, speed_kmh: f64) -> IntensityZone {
    match speed_kmh {
      s if s >= self.explosive => IntensityZone::Explosive,
      s if s >= self.very_high => IntensityZone::VeryHigh,
      s if s >= self.high => IntensityZone::High,
      s if s >= self.moderate => IntensityZone::Moderate,
      _ => IntensityZone::Low,
    }
  }

  /// Lower bound of `zone` (zero for `Low`)
  pub fn lower_bound(&self, zone: IntensityZone) -> f64 {
    match zone {
      IntensityZone::Explosive => self.explosive,
      IntensityZone::VeryHigh => self.very_high,
      IntensityZone::High => self.high,
      IntensityZone::Moderate => self.moderate,
      IntensityZone::Low => 0.0,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Training category indicator
/// ---------------------------------------------------------------------------

/// Non match-day-relative category of a training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrainingCategory {
  NoCategory,
  IndividualTraining,
}

impl TrainingCategory {
  pub fn abbreviation(&self) -> &'static str {
    match self {
      TrainingCategory::NoCategory => "NC",
      TrainingCategory::IndividualTraining => "IT",
    }
  }
}

/// Either a day offset from the next/previous match day or a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BenchmarkIndicator {
  MatchDayOffset(i32),
  Category(TrainingCategory),
}

/// Period name for a match-day offset (MD-4 .. MD+2)
pub fn training_period_name(offset: i32) -> &'static str {
  match offset {
    0 => "Match day",
    1 => "Recovery",
    2 => "Regeneration",
    -1 => "Activation",
    -2 => "Speed",
    -3 => "Endurance",
    -4 => "Strength",
    o if o > 0 => "Off-load",
    _ => "Build-up",
  }
}
