// src/analytics/owners.rs

use serde::Serialize;
use tracing::instrument;

use crate::analytics::{required, EngineError};
use crate::db::{Field, OrderBy, ParcelStore, Predicate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerMatch {
    pub owners: String,
    pub address: String,
}

/// Parcels with any owner name containing `name`, case-insensitively.
#[instrument(skip(store))]
pub fn owners_by_name(
    store: &dyn ParcelStore,
    name: &str,
    limit: usize,
) -> Result<Vec<OwnerMatch>, EngineError> {
    let name = required("name", name)?;
    let filter = Predicate::or(
        [Field::Owner1, Field::Owner2, Field::Owner3]
            .into_iter()
            .map(|f| Predicate::Contains(f, name.to_string())),
    );

    let rows = store.range_query(&filter, &OrderBy::Asc(Field::Owner1), Some(limit))?;
    Ok(rows
        .iter()
        .map(|row| OwnerMatch {
            owners: row.owner_names(),
            address: row.display_address(),
        })
        .collect())
}
