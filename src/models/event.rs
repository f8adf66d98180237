use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::zones::{BenchmarkIndicator, IntensityZones};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
  Training,
  Match,
}

impl EventKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      EventKind::Training => "training",
      EventKind::Match => "match",
    }
  }
}

/// A training session or match as stored in the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id: String,
  pub kind: EventKind,
  pub start_time: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub finished: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub report: Option<Report>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub benchmark: Option<Benchmark>,
  #[serde(default)]
  pub preparation: Preparation,
  #[serde(default)]
  pub sub_sessions: Vec<SubSession>,
}

impl Event {
  pub fn stats(&self) -> Option<&ReportStats> {
    self.report.as_ref().and_then(|r| r.stats.as_ref())
  }

  pub fn sub_session(&self, id: &str) -> Option<&SubSession> {
    self.sub_sessions.iter().find(|s| s.id == id)
  }

  pub fn indicator(&self) -> Option<BenchmarkIndicator> {
    self.benchmark.as_ref().and_then(|b| b.indicator)
  }

  /// Rostered players followed by players that only appear in the report
  pub fn participant_ids(&self) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in &self.preparation.roster {
      if !ids.contains(id) {
        ids.push(id.clone());
      }
    }
    if let Some(stats) = self.stats() {
      for id in stats.players.keys() {
        if !ids.contains(id) {
          ids.push(id.clone());
        }
      }
    }
    ids
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stats: Option<ReportStats>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportStats {
  pub team: MeasurementSet,
  pub players: BTreeMap<String, MeasurementSet>,
}

/// Full-session measurements plus one entry per drill
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementSet {
  pub full: Measurements,
  pub drills: BTreeMap<String, Measurements>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Measurements {
  pub load: f64,
  pub minutes: f64,
  /// Seconds spent per zone
  pub intensity_zones: IntensityZones,
  /// Action count per zone
  pub actions: IntensityZones,
  pub activity: Vec<ActivitySample>,
}

/// One point of an activity graph; `time` is seconds since session start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivitySample {
  pub time: u32,
  pub value: f64,
}

/// Historical reference recorded on a training when it was created
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Benchmark {
  pub indicator: Option<BenchmarkIndicator>,
  pub team: Option<BenchmarkValues>,
  pub players: BTreeMap<String, BenchmarkValues>,
}

impl Benchmark {
  pub fn for_scope(&self, player_id: Option<&str>) -> Option<&BenchmarkValues> {
    match player_id {
      Some(id) => self.players.get(id),
      None => self.team.as_ref(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BenchmarkValues {
  pub load: f64,
  pub minutes: f64,
  pub load_per_minute: f64,
  pub intensity_zones: IntensityZones,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preparation {
  pub roster: Vec<String>,
  pub substitutions: Vec<Substitution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
  pub player_in: String,
  pub player_out: String,
  pub minute: u32,
}

/// A named slice of the session, e.g. a drill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSession {
  pub id: String,
  pub name: String,
  pub start_seconds: u32,
  pub end_seconds: u32,
}

impl SubSession {
  pub fn contains(&self, time: u32) -> bool {
    time >= self.start_seconds && time < self.end_seconds
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_event_document_with_missing_sections() {
    let event: Event = serde_json::from_str(
      r#"{"id": "e1", "kind": "training", "startTime": "2024-03-04T10:00:00Z"}"#,
    )
    .unwrap();

    assert_eq!(event.kind, EventKind::Training);
    assert!(event.stats().is_none());
    assert!(event.indicator().is_none());
    assert!(event.preparation.roster.is_empty());
    assert!(!event.finished);
  }

  #[test]
  fn test_event_document_full_shape() {
    let event: Event = serde_json::from_str(
      r#"{
        "id": "m1",
        "kind": "match",
        "startTime": "2024-03-09T15:00:00Z",
        "finished": true,
        "report": {"stats": {
          "team": {"full": {"load": 420.5, "minutes": 95, "intensityZones": {"high": 300}}},
          "players": {"p1": {"full": {"load": 80}, "drills": {"d1": {"load": 20}}}}
        }},
        "benchmark": {"indicator": 0, "team": {"load": 400}},
        "preparation": {"roster": ["p1", "p2"], "substitutions": [{"playerIn": "p2", "playerOut": "p1", "minute": 60}]},
        "subSessions": [{"id": "d1", "name": "First half", "startSeconds": 0, "endSeconds": 2700}]
      }"#,
    )
    .unwrap();

    let stats = event.stats().unwrap();
    assert_eq!(stats.team.full.load, 420.5);
    assert_eq!(stats.players["p1"].drills["d1"].load, 20.0);
    assert_eq!(event.indicator(), Some(BenchmarkIndicator::MatchDayOffset(0)));
    assert_eq!(event.preparation.substitutions[0].minute, 60);
    assert!(event.sub_session("d1").unwrap().contains(2699));
    assert!(!event.sub_session("d1").unwrap().contains(2700));
  }

  #[test]
  fn test_participants_roster_first_then_reporting() {
    let mut event: Event = serde_json::from_str(
      r#"{"id": "e1", "kind": "training", "startTime": "2024-03-04T10:00:00Z",
          "preparation": {"roster": ["p2", "p1", "p2"]},
          "report": {"stats": {"players": {"p1": {}, "p3": {}}}}}"#,
    )
    .unwrap();

    assert_eq!(event.participant_ids(), vec!["p2", "p1", "p3"]);

    event.report = None;
    assert_eq!(event.participant_ids(), vec!["p2", "p1"]);
  }
}
