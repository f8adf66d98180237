use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::event::BenchmarkValues;
use crate::zones::{Gender, Sport, ZoneThresholds};

/// Club record holding the best-match reference values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub sport: Sport,
  #[serde(default)]
  pub gender: Gender,
  #[serde(default)]
  pub best_match: BestMatch,
}

impl Club {
  pub fn thresholds(&self) -> ZoneThresholds {
    ZoneThresholds::for_sport(self.sport, self.gender)
  }
}

/// Stats of the highest-intensity match on record, team and per player
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BestMatch {
  pub team: Option<BenchmarkValues>,
  pub players: BTreeMap<String, BenchmarkValues>,
}

impl BestMatch {
  pub fn for_scope(&self, player_id: Option<&str>) -> Option<&BenchmarkValues> {
    match player_id {
      Some(id) => self.players.get(id),
      None => self.team.as_ref(),
    }
  }
}
