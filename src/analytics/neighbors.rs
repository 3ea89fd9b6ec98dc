// src/analytics/neighbors.rs

use serde::Serialize;
use tracing::{debug, instrument};

use crate::analytics::{EngineError, Lookup};
use crate::db::{Agg, Field, OrderBy, ParcelStore, Predicate};
use crate::domain::address::abbreviate_street_suffix;
use crate::domain::geometry::Point;

pub const DEFAULT_NEIGHBOR_LIMIT: usize = 50;

/// Which parcel to search around. Exactly one form is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborTarget {
    Pin(String),
    Address { address: String, city: String },
}

impl NeighborTarget {
    /// Accepts `pin` alone, or `address` with `city`. Blank values count as absent.
    pub fn from_params(
        pin: Option<&str>,
        address: Option<&str>,
        city: Option<&str>,
    ) -> Result<Self, EngineError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        match (present(pin), present(address), present(city)) {
            (Some(pin), None, None) => Ok(NeighborTarget::Pin(pin.to_string())),
            (None, Some(address), Some(city)) => Ok(NeighborTarget::Address {
                address: address.to_string(),
                city: city.to_string(),
            }),
            (Some(_), _, _) => Err(EngineError::Validation(
                "provide either pin or address and city, not both".into(),
            )),
            (None, Some(_), None) | (None, None, Some(_)) => Err(EngineError::Validation(
                "address and city must be provided together".into(),
            )),
            (None, None, None) => Err(EngineError::Validation(
                "provide either pin or address and city".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborRecord {
    pub object_id: i64,
    pub pin: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub price: Option<f64>,
    pub distance_feet: f64,
}

/// Mean location of every row sharing the identifying key; None when no row
/// carries coordinates.
fn reference_point(
    store: &dyn ParcelStore,
    key: &Predicate,
) -> Result<Option<Point>, EngineError> {
    let rows = store.aggregate(
        &[],
        &Predicate::and([key.clone(), Predicate::has_location()]),
        &[Agg::Avg(Field::X), Agg::Avg(Field::Y), Agg::CountAll],
    )?;
    Ok(rows.first().and_then(|row| {
        if row.count(2) == 0 {
            return None;
        }
        Some(Point::new(row.value(0)?, row.value(1)?))
    }))
}

/// Primary-record parcels nearest the target, excluding the target itself.
/// PIN searches stay within the target's zip; address searches within its city.
#[instrument(skip(store))]
pub fn find_neighbors(
    store: &dyn ParcelStore,
    target: &NeighborTarget,
    limit: usize,
    primary_record_code: &str,
) -> Result<Lookup<Vec<NeighborRecord>>, EngineError> {
    if limit == 0 {
        return Err(EngineError::Validation("limit must be at least 1".into()));
    }

    let (key, area) = match target {
        NeighborTarget::Pin(pin) => {
            let key = Predicate::matches(Field::Pin, pin.as_str());
            let Some(subject) = store.find_one(&key)? else {
                return Ok(Lookup::NotFound);
            };
            let Some(zip) = subject.zip.filter(|z| !z.trim().is_empty()) else {
                debug!(pin, "reference parcel has no zip; no neighbors");
                return Ok(Lookup::Found(Vec::new()));
            };
            (key, Predicate::matches(Field::Zip, zip))
        }
        NeighborTarget::Address { address, city } => {
            let key = Predicate::and([
                Predicate::matches(Field::PropAddress, abbreviate_street_suffix(address)),
                Predicate::matches(Field::City, city.as_str()),
            ]);
            (key, Predicate::matches(Field::City, city.as_str()))
        }
    };

    let Some(origin) = reference_point(store, &key)? else {
        return Ok(Lookup::NotFound);
    };

    let rows = store.range_query(
        &Predicate::and([
            Predicate::matches(Field::RecordCode, primary_record_code),
            area,
            Predicate::negate(key),
            Predicate::has_location(),
        ]),
        &OrderBy::DistanceFrom(origin),
        Some(limit),
    )?;

    let neighbors = rows
        .into_iter()
        .filter_map(|row| {
            let at = row.location()?;
            Some(NeighborRecord {
                object_id: row.object_id,
                distance_feet: origin.distance_to(&at),
                pin: row.pin,
                address: row.prop_address,
                city: row.city,
                zip: row.zip,
                price: row.value_current,
            })
        })
        .collect::<Vec<_>>();

    debug!(count = neighbors.len(), "neighbors ranked");
    Ok(Lookup::Found(neighbors))
}
