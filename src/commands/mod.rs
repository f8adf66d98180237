pub mod stats;
pub mod weekly;

use crate::db::{self, AppState, StoreError};
use crate::models::{BestMatch, Club, Event, Player};

/// ---------------------------------------------------------------------------
/// Document Cache Commands
/// ---------------------------------------------------------------------------

/// Cache an event document delivered by the sync layer
pub async fn store_event(state: &AppState, event: Event) -> Result<(), StoreError> {
  db::upsert_event(&state.db, &event).await
}

pub async fn store_player(state: &AppState, player: Player) -> Result<(), StoreError> {
  db::upsert_player(&state.db, &player).await
}

pub async fn store_club(state: &AppState, club: Club) -> Result<(), StoreError> {
  db::upsert_club(&state.db, &club).await
}

pub async fn get_events(state: &AppState) -> Result<Vec<Event>, StoreError> {
  db::list_events(&state.db).await
}

pub async fn get_players(state: &AppState) -> Result<Vec<Player>, StoreError> {
  db::list_players(&state.db).await
}

/// ---------------------------------------------------------------------------
/// Shared Lookups
/// ---------------------------------------------------------------------------

/// An event that is not cached is treated as absent, not as a failure
pub(crate) async fn find_event(state: &AppState, event_id: &str) -> Result<Option<Event>, StoreError> {
  match db::get_event(&state.db, event_id).await {
    Ok(event) => Ok(Some(event)),
    Err(StoreError::NotFound { .. }) => {
      tracing::debug!(event_id, "event not cached");
      Ok(None)
    }
    Err(e) => Err(e),
  }
}

/// The configured club, if there is one and it is cached
pub(crate) async fn load_club(state: &AppState) -> Result<Option<Club>, StoreError> {
  let Some(club_id) = state.config.club_id.as_deref() else {
    return Ok(None);
  };

  match db::get_club(&state.db, club_id).await {
    Ok(club) => Ok(Some(club)),
    Err(StoreError::NotFound { .. }) => {
      tracing::warn!(club_id, "configured club not cached, using defaults");
      Ok(None)
    }
    Err(e) => Err(e),
  }
}

/// Best match of the configured club
pub(crate) async fn load_best_match(state: &AppState) -> Result<Option<BestMatch>, StoreError> {
  Ok(load_club(state).await?.map(|club| club.best_match))
}
