// src/analytics/mod.rs
//
// The comparables and classification engine. Every operation takes the
// parcel store explicitly and returns plain, serializable results.

pub mod comps;
pub mod fun_facts;
pub mod mailing;
pub mod neighbors;
pub mod occupancy;
pub mod owners;
pub mod stars;
pub mod turnover;

use thiserror::Error;

use crate::domain::address::AddressError;
use crate::errors::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or conflicting caller input.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of an operation about one subject parcel. Absence is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100` rounded to cents; None when the whole is empty.
pub(crate) fn percent(part: f64, whole: f64) -> Option<f64> {
    if whole > 0.0 {
        Some(round2(part / whole * 100.0))
    } else {
        None
    }
}

/// Trimmed, non-empty caller text or a validation error naming the parameter.
pub(crate) fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, EngineError> {
    let value = value.trim();
    if value.is_empty() {
        Err(EngineError::Validation(format!("{name} is required")))
    } else {
        Ok(value)
    }
}
