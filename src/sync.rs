// Bringing the local store up to date with a summoner's match list.

use crate::api::models::Match;
use crate::error::AppError;
use crate::storage::Storage;
use tracing::{info, warn};

/// Ids from `listed` that are not stored yet, in list order (most recent
/// first), capped at `max_fetch`.
pub fn pending_game_ids(storage: &Storage, listed: &[i64], max_fetch: usize) -> Vec<i64> {
    let mut ids = storage.filter_game_ids(listed);
    ids.truncate(max_fetch);
    ids
}

/// Fetch every id in order and upsert the results. The first failure stops
/// the run; anything fetched before it is still saved.
pub fn fetch_and_store<F>(
    storage: &mut Storage,
    game_ids: &[i64],
    mut fetch: F,
) -> Result<usize, AppError>
where
    F: FnMut(i64) -> Result<Match, AppError>,
{
    let mut fetched = Vec::with_capacity(game_ids.len());
    let mut failure = None;

    for &game_id in game_ids {
        match fetch(game_id) {
            Ok(m) => fetched.push(m),
            Err(e) => {
                warn!(game_id, error = %e, "match fetch failed");
                failure = Some(e);
                break;
            }
        }
    }

    let saved = fetched.len();
    if saved > 0 {
        storage.upsert_records(fetched)?;
    }

    match failure {
        None => {
            info!(saved, "storage up to date");
            Ok(saved)
        }
        Some(e) if saved == 0 => Err(e),
        Some(e) => Err(AppError::PartialFetch {
            saved,
            source: Box::new(e),
        }),
    }
}
