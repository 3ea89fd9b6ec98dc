// src/analytics/turnover.rs

use chrono::{Months, NaiveDate};
use serde::Serialize;
use tracing::instrument;

use crate::analytics::{percent, round2, EngineError};
use crate::db::{Agg, AggRow, Field, ParcelStore, Predicate};

pub const DEFAULT_TURNOVER_YEARS: u32 = 10;
const MAX_TURNOVER_YEARS: u32 = 100;

/// Trailing sale window ending on `as_of`, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnoverWindow {
    years: u32,
    as_of: NaiveDate,
}

impl TurnoverWindow {
    pub fn new(years: u32, as_of: NaiveDate) -> Result<Self, EngineError> {
        if years == 0 || years > MAX_TURNOVER_YEARS {
            return Err(EngineError::Validation(format!(
                "years must be between 1 and {MAX_TURNOVER_YEARS}, got {years}"
            )));
        }
        Ok(Self { years, as_of })
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn start(&self) -> NaiveDate {
        self.as_of
            .checked_sub_months(Months::new(12 * self.years))
            .unwrap_or(NaiveDate::MIN)
    }

    fn sold_within(&self) -> Predicate {
        Predicate::SoldBetween {
            from: self.start(),
            to: self.as_of,
        }
    }

    /// `[parcels, parcels sold]`, counted by PIN so multi-record parcels count once.
    fn parcel_counts(&self) -> [Agg; 2] {
        [
            Agg::CountDistinct(Field::Pin),
            Agg::CountDistinctWhere(Field::Pin, self.sold_within()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverRow {
    pub name: String,
    pub total_parcels: i64,
    pub sold_parcels: i64,
    pub turnover_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverReport {
    pub group_by: &'static str,
    pub years: u32,
    pub window_start: NaiveDate,
    pub as_of: NaiveDate,
    pub rows: Vec<TurnoverRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueChangeRow {
    pub neighborhood: String,
    pub current_total: f64,
    pub prior_total: f64,
    pub value_change: f64,
    pub percent_change: f64,
}

/// Share of parcels per neighborhood with a sale inside the window.
#[instrument(skip(store))]
pub fn turnover_by_neighborhood(
    store: &dyn ParcelStore,
    window: TurnoverWindow,
) -> Result<TurnoverReport, EngineError> {
    let rows = store.aggregate(&[Field::Neighborhood], &Predicate::All, &window.parcel_counts())?;
    Ok(report("neighborhood", window, turnover_rows(&rows, 0)))
}

/// Same as [`turnover_by_neighborhood`] but per subdivision, restricted to one
/// tax class prefix; subdivisions smaller than `min_parcels` are suppressed.
#[instrument(skip(store))]
pub fn turnover_by_subdivision(
    store: &dyn ParcelStore,
    window: TurnoverWindow,
    tax_class_prefix: &str,
    min_parcels: i64,
) -> Result<TurnoverReport, EngineError> {
    let rows = store.aggregate(
        &[Field::Subdivision],
        &Predicate::StartsWith(Field::TaxClass, tax_class_prefix.to_string()),
        &window.parcel_counts(),
    )?;
    Ok(report("subdivision", window, turnover_rows(&rows, min_parcels)))
}

fn report(group_by: &'static str, window: TurnoverWindow, rows: Vec<TurnoverRow>) -> TurnoverReport {
    TurnoverReport {
        group_by,
        years: window.years(),
        window_start: window.start(),
        as_of: window.as_of(),
        rows,
    }
}

/// Expects rows of `[group key] x [total, sold]`. Null groups are dropped.
fn turnover_rows(rows: &[AggRow], min_parcels: i64) -> Vec<TurnoverRow> {
    let mut out: Vec<TurnoverRow> = rows
        .iter()
        .filter_map(|row| {
            let name = row.key(0)?.to_string();
            let total = row.count(0);
            let sold = row.count(1);
            Some(TurnoverRow {
                name,
                total_parcels: total,
                sold_parcels: sold,
                turnover_percent: percent(sold as f64, total as f64),
            })
        })
        .filter(|row| row.total_parcels >= min_parcels)
        .collect();

    out.sort_by(|a, b| {
        let by_pct = match (a.turnover_percent, b.turnover_percent) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        by_pct.then_with(|| a.name.cmp(&b.name))
    });
    out
}

/// Year-over-year change in summed assessed value per residential neighborhood,
/// over primary records only. Neighborhoods with no positive prior-year total
/// are left out.
#[instrument(skip(store))]
pub fn value_change_by_neighborhood(
    store: &dyn ParcelStore,
    tax_class_prefix: &str,
    primary_record_code: &str,
) -> Result<Vec<ValueChangeRow>, EngineError> {
    let rows = store.aggregate(
        &[Field::Neighborhood],
        &Predicate::and([
            Predicate::StartsWith(Field::TaxClass, tax_class_prefix.to_string()),
            Predicate::matches(Field::RecordCode, primary_record_code),
        ]),
        &[Agg::Sum(Field::ValueCurrent), Agg::Sum(Field::ValuePrior)],
    )?;
    Ok(value_change_rows(&rows))
}

fn value_change_rows(rows: &[AggRow]) -> Vec<ValueChangeRow> {
    let mut out: Vec<ValueChangeRow> = rows
        .iter()
        .filter_map(|row| {
            let neighborhood = row.key(0)?.to_string();
            let current = row.value(0)?;
            let prior = row.value(1).filter(|p| *p > 0.0)?;
            let delta = current - prior;
            Some(ValueChangeRow {
                neighborhood,
                current_total: current,
                prior_total: prior,
                value_change: round2(delta),
                percent_change: round2(delta / prior * 100.0),
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.percent_change
            .total_cmp(&a.percent_change)
            .then_with(|| a.neighborhood.cmp(&b.neighborhood))
    });
    out
}
