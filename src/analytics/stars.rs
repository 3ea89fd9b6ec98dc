// src/analytics/stars.rs

use serde::Serialize;
use tracing::{info, instrument};

use crate::analytics::{EngineError, Lookup};
use crate::db::{Field, ParcelStore, Predicate, StarredParcel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteOutcome {
    pub ok: bool,
    pub rows_affected: usize,
}

/// Stars an existing parcel for `username`. Starring twice reports 0 rows.
#[instrument(skip(store))]
pub fn star_parcel(
    store: &dyn ParcelStore,
    username: &str,
    object_id: i64,
    now: i64,
) -> Result<Lookup<WriteOutcome>, EngineError> {
    let exists = store.count(&Predicate::matches(Field::ObjectId, object_id.to_string()))?;
    if exists == 0 {
        return Ok(Lookup::NotFound);
    }

    let rows_affected = store.append_star(&StarredParcel {
        username: username.to_string(),
        object_id,
        created_at: now,
    })?;
    info!(username, object_id, rows_affected, "parcel starred");
    Ok(Lookup::Found(WriteOutcome {
        ok: true,
        rows_affected,
    }))
}

/// Removes a star owned by `username`. Removing a star the caller does not
/// own (or that does not exist) is rejected rather than ignored.
#[instrument(skip(store))]
pub fn unstar_parcel(
    store: &dyn ParcelStore,
    username: &str,
    object_id: i64,
) -> Result<WriteOutcome, EngineError> {
    let rows_affected = store.remove_star(username, object_id)?;
    if rows_affected == 0 {
        return Err(EngineError::Validation(format!(
            "parcel {object_id} is not starred by {username}"
        )));
    }
    info!(username, object_id, "parcel unstarred");
    Ok(WriteOutcome {
        ok: true,
        rows_affected,
    })
}

pub fn list_stars(
    store: &dyn ParcelStore,
    username: &str,
) -> Result<Vec<StarredParcel>, EngineError> {
    Ok(store.stars_for(username)?)
}
