// src/analytics/comps.rs

use serde::Serialize;
use tracing::{debug, instrument};

use crate::analytics::{required, EngineError, Lookup};
use crate::db::{Agg, Field, OrderBy, ParcelStore, Predicate};
use crate::domain::geometry::{feet_to_miles, miles_to_feet};
use crate::domain::parcel::ParcelRow;

pub const DEFAULT_RADIUS_MILES: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectProperty {
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub price_range: Option<f64>,
    pub avg_price: Option<f64>,
    pub num_properties: i64,
}

impl PriceStats {
    pub fn empty() -> Self {
        Self {
            min_price: None,
            max_price: None,
            price_range: None,
            avg_price: None,
            num_properties: 0,
        }
    }

    /// Stats over an in-memory price list.
    pub fn from_prices(prices: &[f64]) -> Self {
        if prices.is_empty() {
            return Self::empty();
        }
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = prices.iter().sum::<f64>() / prices.len() as f64;
        Self {
            min_price: Some(min),
            max_price: Some(max),
            price_range: Some(max - min),
            avg_price: Some(avg),
            num_properties: prices.len() as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityComps {
    pub property: SubjectProperty,
    pub city_stats: Option<PriceStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodComps {
    pub property: SubjectProperty,
    pub neighborhood_stats: Option<PriceStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparable {
    pub address: Option<String>,
    pub city: Option<String>,
    pub price: Option<f64>,
    pub distance_miles: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusComps {
    pub property: SubjectProperty,
    pub radius_miles: f64,
    pub comp_stats: PriceStats,
    pub comparables: Vec<Comparable>,
}

/// City-wide comparison for the parcel at `address` in `city`.
#[instrument(skip(store))]
pub fn city_comps(
    store: &dyn ParcelStore,
    address: &str,
    city: &str,
) -> Result<Lookup<CityComps>, EngineError> {
    let address = required("address", address)?;
    let city = required("city", city)?;

    let Some((subject, stats)) = area_comps(store, address, Field::City, city)? else {
        return Ok(Lookup::NotFound);
    };
    Ok(Lookup::Found(CityComps {
        property: SubjectProperty {
            address: subject.prop_address,
            city: subject.city,
            neighborhood: None,
            price: subject.value_current,
        },
        city_stats: stats,
    }))
}

/// Neighborhood-wide comparison for the parcel at `address` in `neighborhood`.
#[instrument(skip(store))]
pub fn neighborhood_comps(
    store: &dyn ParcelStore,
    address: &str,
    neighborhood: &str,
) -> Result<Lookup<NeighborhoodComps>, EngineError> {
    let address = required("address", address)?;
    let neighborhood = required("neighborhood", neighborhood)?;

    let Some((subject, stats)) = area_comps(store, address, Field::Neighborhood, neighborhood)?
    else {
        return Ok(Lookup::NotFound);
    };
    Ok(Lookup::Found(NeighborhoodComps {
        property: SubjectProperty {
            address: subject.prop_address,
            city: None,
            neighborhood: subject.neighborhood,
            price: subject.value_current,
        },
        neighborhood_stats: stats,
    }))
}

/// Subject lookup plus price stats over every priced parcel in the same area.
/// The subject counts toward its own area's stats whenever it has a price.
fn area_comps(
    store: &dyn ParcelStore,
    address: &str,
    area: Field,
    area_value: &str,
) -> Result<Option<(ParcelRow, Option<PriceStats>)>, EngineError> {
    let subject = store.find_one(&Predicate::and([
        Predicate::matches(Field::PropAddress, address),
        Predicate::matches(area, area_value),
    ]))?;
    let Some(subject) = subject else {
        debug!(address, area_value, "subject parcel not found");
        return Ok(None);
    };

    let rows = store.aggregate(
        &[],
        &Predicate::and([
            Predicate::matches(area, area_value),
            Predicate::NotNull(Field::ValueCurrent),
        ]),
        &[
            Agg::Min(Field::ValueCurrent),
            Agg::Max(Field::ValueCurrent),
            Agg::Avg(Field::ValueCurrent),
            Agg::Count(Field::ValueCurrent),
        ],
    )?;

    let stats = rows.first().and_then(|row| {
        let count = row.count(3);
        if count == 0 {
            return None;
        }
        let (min, max) = (row.value(0), row.value(1));
        Some(PriceStats {
            min_price: min,
            max_price: max,
            price_range: min.zip(max).map(|(lo, hi)| hi - lo),
            avg_price: row.value(2),
            num_properties: count,
        })
    });

    Ok(Some((subject, stats)))
}

/// Up to `limit` priced parcels within `radius_miles` of the subject, nearest
/// first. The subject is never its own comparable.
#[instrument(skip(store))]
pub fn radius_comps(
    store: &dyn ParcelStore,
    address: &str,
    city: &str,
    radius_miles: Option<f64>,
    limit: usize,
) -> Result<Lookup<RadiusComps>, EngineError> {
    let address = required("address", address)?;
    let city = required("city", city)?;
    let radius_miles = radius_miles.unwrap_or(DEFAULT_RADIUS_MILES);
    if !radius_miles.is_finite() || radius_miles < 0.0 {
        return Err(EngineError::Validation(format!(
            "radius must be a non-negative number of miles, got {radius_miles}"
        )));
    }

    let same_parcel = Predicate::and([
        Predicate::matches(Field::PropAddress, address),
        Predicate::matches(Field::City, city),
    ]);

    let subject = store.find_one(&Predicate::and([
        same_parcel.clone(),
        Predicate::has_location(),
    ]))?;
    let Some(subject) = subject else {
        return Ok(Lookup::NotFound);
    };
    let Some(origin) = subject.location() else {
        return Ok(Lookup::NotFound);
    };

    let property = SubjectProperty {
        address: subject.prop_address.clone(),
        city: subject.city.clone(),
        neighborhood: None,
        price: subject.value_current,
    };

    if radius_miles == 0.0 || limit == 0 {
        return Ok(Lookup::Found(RadiusComps {
            property,
            radius_miles,
            comp_stats: PriceStats::empty(),
            comparables: Vec::new(),
        }));
    }

    let candidates = store.range_query(
        &Predicate::and([
            Predicate::NotNull(Field::ValueCurrent),
            Predicate::Within {
                origin,
                radius_feet: miles_to_feet(radius_miles),
            },
            Predicate::negate(same_parcel),
        ]),
        &OrderBy::DistanceFrom(origin),
        Some(limit),
    )?;

    let comparables: Vec<Comparable> = candidates
        .into_iter()
        .filter_map(|row| {
            let at = row.location()?;
            Some(Comparable {
                distance_miles: feet_to_miles(origin.distance_to(&at)),
                address: row.prop_address,
                city: row.city,
                price: row.value_current,
            })
        })
        .collect();

    let prices: Vec<f64> = comparables.iter().filter_map(|c| c.price).collect();
    debug!(found = comparables.len(), "radius comparables selected");

    Ok(Lookup::Found(RadiusComps {
        property,
        radius_miles,
        comp_stats: PriceStats::from_prices(&prices),
        comparables,
    }))
}
