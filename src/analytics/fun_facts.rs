// src/analytics/fun_facts.rs

use serde::Serialize;
use tracing::instrument;

use crate::analytics::EngineError;
use crate::db::{Agg, AggRow, Field, ParcelStore, Predicate};

const TOP_STREETS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedValue {
    pub name: String,
    /// Display form, e.g. "1,234,567".
    pub value: String,
    pub num_val: f64,
}

/// The three streets with the largest total assessed value.
#[instrument(skip(store))]
pub fn most_valuable_streets(store: &dyn ParcelStore) -> Result<Vec<RankedValue>, EngineError> {
    let rows = store.aggregate(
        &[Field::PropStreetName],
        &Predicate::All,
        &[Agg::Sum(Field::ValueCurrent)],
    )?;
    let mut ranked = rank(&rows);
    ranked.truncate(TOP_STREETS);
    Ok(ranked)
}

/// Every street type ranked by average assessed value per parcel.
#[instrument(skip(store))]
pub fn most_valuable_street_types(
    store: &dyn ParcelStore,
) -> Result<Vec<RankedValue>, EngineError> {
    let rows = store.aggregate(
        &[Field::PropStreetType],
        &Predicate::All,
        &[Agg::Avg(Field::ValueCurrent)],
    )?;
    Ok(rank(&rows))
}

fn rank(rows: &[AggRow]) -> Vec<RankedValue> {
    let mut out: Vec<RankedValue> = rows
        .iter()
        .filter_map(|row| {
            let num_val = row.value(0)?;
            Some(RankedValue {
                name: row.key(0)?.to_string(),
                value: format_thousands(num_val),
                num_val,
            })
        })
        .collect();
    out.sort_by(|a, b| b.num_val.total_cmp(&a.num_val).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Rounds to whole units and groups digits by thousands.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
