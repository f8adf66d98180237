//! Week-level commands: overview, week-vs-week comparison and load ratio

use chrono::{DateTime, Utc};

use crate::aggregate::{
  acute_chronic_ratio, compare_weeks, weekly_load_data, AcuteChronic, WeekComparison, WeekWindow,
  WeeklyLoad,
};
use crate::db::{self, AppState, StoreError};
use crate::stats::ComparisonMode;

/// Weeks loaded before the current one for `Last4Weeks`
const HISTORY_WEEKS: i64 = 4;

pub async fn get_week_overview(state: &AppState, reference: DateTime<Utc>) -> Result<WeeklyLoad, StoreError> {
  let window = WeekWindow::containing(reference, state.config.week_start);
  let events = db::list_events_between(&state.db, window.start, window.end).await?;
  let players = db::list_players(&state.db).await?;

  Ok(weekly_load_data(&events, &players, reference, state.config.week_start))
}

/// Compare the week containing `reference` with last week, the last four
/// weeks or the week containing `selected`
pub async fn get_week_comparison(
  state: &AppState,
  reference: DateTime<Utc>,
  mode: ComparisonMode,
  selected: Option<DateTime<Utc>>,
) -> Result<WeekComparison, StoreError> {
  let week_start = state.config.week_start;
  let window = WeekWindow::containing(reference, week_start);
  let selected = selected.map(|at| WeekWindow::containing(at, week_start));

  let mut start = window.shifted(-HISTORY_WEEKS).start;
  let mut end = window.end;
  if let Some(sel) = selected {
    start = start.min(sel.start);
    end = end.max(sel.end);
  }

  let events = db::list_events_between(&state.db, start, end).await?;
  Ok(compare_weeks(&events, window, mode, selected))
}

pub async fn get_acute_chronic(
  state: &AppState,
  player_id: Option<&str>,
  reference: DateTime<Utc>,
) -> Result<AcuteChronic, StoreError> {
  let events = db::list_finished_events(&state.db, reference).await?;
  let result = acute_chronic_ratio(&events, player_id, reference);

  tracing::debug!(
    player_id = player_id.unwrap_or("team"),
    ratio = result.ratio,
    "acute/chronic ratio"
  );
  Ok(result)
}
