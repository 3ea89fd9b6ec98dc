// src/db/port.rs
//
// The read/aggregate/write surface the analytics need from a parcel store.
// Predicates are data, never query text; each store compiles them itself.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::geometry::Point;
use crate::domain::parcel::ParcelRow;
use crate::errors::StoreError;

/// Parcel attributes addressable by predicates, groupings and updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ObjectId,
    Pin,
    RecordCode,
    PropAddress,
    PropStreetName,
    PropStreetType,
    City,
    Zip,
    Owner1,
    Owner2,
    Owner3,
    MailStreetNumber,
    MailDirection,
    MailStreetName,
    MailStreetType,
    MailSuffix,
    MailCity,
    MailState,
    MailZip5,
    MailZip4,
    ValueCurrent,
    ValuePrior,
    X,
    Y,
    PropertyType,
    Neighborhood,
    Subdivision,
    TaxClass,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    /// Normalized string equality.
    Matches(Field, String),
    /// Normalized substring containment.
    Contains(Field, String),
    /// Normalized prefix.
    StartsWith(Field, String),
    NotNull(Field),
    /// Planar distance from `origin` at most `radius_feet`; rows without
    /// coordinates never match.
    Within { origin: Point, radius_feet: f64 },
    /// Any of the historical sale dates falls in `from..=to`.
    SoldBetween { from: NaiveDate, to: NaiveDate },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(parts.into_iter().collect())
    }

    pub fn or(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(parts.into_iter().collect())
    }

    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    pub fn matches(field: Field, value: impl Into<String>) -> Self {
        Predicate::Matches(field, value.into())
    }

    pub fn has_location() -> Self {
        Predicate::and([Predicate::NotNull(Field::X), Predicate::NotNull(Field::Y)])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Agg {
    CountAll,
    Count(Field),
    Min(Field),
    Max(Field),
    Avg(Field),
    Sum(Field),
    /// Distinct non-null values of the field.
    CountDistinct(Field),
    /// Distinct values of the field among rows satisfying the predicate.
    CountDistinctWhere(Field, Predicate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    /// Store order (stable by object id).
    Natural,
    Asc(Field),
    /// Nearest first.
    DistanceFrom(Point),
}

/// One aggregate output row: normalized group keys (None for null/blank)
/// followed by one value per requested aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct AggRow {
    pub keys: Vec<Option<String>>,
    pub values: Vec<Option<f64>>,
}

impl AggRow {
    pub fn key(&self, i: usize) -> Option<&str> {
        self.keys.get(i).and_then(|k| k.as_deref())
    }

    pub fn value(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().flatten()
    }

    pub fn count(&self, i: usize) -> i64 {
        self.value(i).map(|v| v as i64).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub field: Field,
    pub value: Option<String>,
}

impl Assignment {
    pub fn set(field: Field, value: Option<String>) -> Self {
        Self { field, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarredParcel {
    pub username: String,
    pub object_id: i64,
    pub created_at: i64,
}

pub trait ParcelStore: Send + Sync {
    /// First row matching `filter`, in store order.
    fn find_one(&self, filter: &Predicate) -> Result<Option<ParcelRow>, StoreError>;

    /// Grouped aggregates. With no group keys exactly one row is returned.
    fn aggregate(
        &self,
        group_by: &[Field],
        filter: &Predicate,
        aggs: &[Agg],
    ) -> Result<Vec<AggRow>, StoreError>;

    fn range_query(
        &self,
        filter: &Predicate,
        order: &OrderBy,
        limit: Option<usize>,
    ) -> Result<Vec<ParcelRow>, StoreError>;

    fn count(&self, filter: &Predicate) -> Result<i64, StoreError>;

    /// Applies every assignment to every matching row, all or nothing.
    fn update(&self, filter: &Predicate, fields: &[Assignment]) -> Result<usize, StoreError>;

    /// Records a star; starring twice is a no-op reported as 0 rows.
    fn append_star(&self, star: &StarredParcel) -> Result<usize, StoreError>;

    fn remove_star(&self, username: &str, object_id: i64) -> Result<usize, StoreError>;

    /// Newest first.
    fn stars_for(&self, username: &str) -> Result<Vec<StarredParcel>, StoreError>;
}
