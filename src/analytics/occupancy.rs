// src/analytics/occupancy.rs

use serde::Serialize;
use tracing::instrument;

use crate::analytics::{percent, required, EngineError};
use crate::db::{Agg, Field, OrderBy, ParcelStore, Predicate};
use crate::domain::normalize::normalize;
use crate::domain::occupancy::{classify, OccupancyType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyCount {
    pub occupancy_type: OccupancyType,
    pub count: i64,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityOccupancy {
    pub city: String,
    pub total: i64,
    pub occupancy_counts: Vec<OccupancyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyTypeCount {
    pub property_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityPropertyTypes {
    pub city: String,
    pub property_types: Vec<PropertyTypeCount>,
}

/// Classifies every parcel in `city` by its primary record and counts each
/// occupancy label. All three labels are always reported, in a fixed order.
#[instrument(skip(store))]
pub fn occupancy_by_city(
    store: &dyn ParcelStore,
    city: &str,
    primary_record_code: &str,
) -> Result<CityOccupancy, EngineError> {
    let city = required("city", city)?;
    let parcels = store.range_query(
        &Predicate::and([
            Predicate::matches(Field::City, city),
            Predicate::matches(Field::RecordCode, primary_record_code),
        ]),
        &OrderBy::Natural,
        None,
    )?;

    let mut counts = [0i64; 3];
    for parcel in &parcels {
        let label = classify(parcel);
        if let Some(i) = OccupancyType::ALL.iter().position(|t| *t == label) {
            counts[i] += 1;
        }
    }
    let total = parcels.len() as i64;

    let occupancy_counts = OccupancyType::ALL
        .iter()
        .zip(counts)
        .map(|(label, count)| OccupancyCount {
            occupancy_type: *label,
            count,
            percent: percent(count as f64, total as f64),
        })
        .collect();

    Ok(CityOccupancy {
        city: normalize(city),
        total,
        occupancy_counts,
    })
}

/// Parcel counts per property type in `city`, most common first.
#[instrument(skip(store))]
pub fn property_types_by_city(
    store: &dyn ParcelStore,
    city: &str,
) -> Result<CityPropertyTypes, EngineError> {
    let city = required("city", city)?;
    let rows = store.aggregate(
        &[Field::PropertyType],
        &Predicate::matches(Field::City, city),
        &[Agg::CountAll],
    )?;

    let mut property_types: Vec<PropertyTypeCount> = rows
        .iter()
        .map(|row| PropertyTypeCount {
            property_type: row.key(0).unwrap_or("UNKNOWN").to_string(),
            count: row.count(0),
        })
        .collect();
    property_types.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.property_type.cmp(&b.property_type))
    });

    Ok(CityPropertyTypes {
        city: normalize(city),
        property_types,
    })
}
