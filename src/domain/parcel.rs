// src/domain/parcel.rs

use crate::domain::geometry::Point;
use crate::domain::normalize::normalize_parts;

/// One row of the parcel store, as read by the analytics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParcelRow {
    pub object_id: i64,
    pub pin: String,

    pub prop_address: Option<String>,
    pub prop_street_number: Option<String>,
    pub prop_direction: Option<String>,
    pub prop_street_name: Option<String>,
    pub prop_street_type: Option<String>,
    pub prop_suffix: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,

    pub owners: [Option<String>; 3],

    pub mail_street_number: Option<String>,
    pub mail_direction: Option<String>,
    pub mail_street_name: Option<String>,
    pub mail_street_type: Option<String>,
    pub mail_suffix: Option<String>,
    pub mail_city: Option<String>,
    pub mail_state: Option<String>,
    pub mail_zip5: Option<String>,
    pub mail_zip4: Option<String>,

    pub value_current: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub ownership_code: Option<String>,
    pub neighborhood: Option<String>,
}

impl ParcelRow {
    /// Null coordinates exclude a parcel from every distance computation.
    pub fn location(&self) -> Option<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// Normalized property street line. Falls back to the free-text column
    /// when the structured fields are blank.
    pub fn property_key(&self) -> String {
        let key = normalize_parts([
            self.prop_street_number.as_deref(),
            self.prop_direction.as_deref(),
            self.prop_street_name.as_deref(),
            self.prop_street_type.as_deref(),
            self.prop_suffix.as_deref(),
        ]);
        if key.is_empty() {
            normalize_parts([self.prop_address.as_deref()])
        } else {
            key
        }
    }

    /// Normalized mailing street line; empty when there is no mailing data.
    pub fn mailing_key(&self) -> String {
        normalize_parts([
            self.mail_street_number.as_deref(),
            self.mail_direction.as_deref(),
            self.mail_street_name.as_deref(),
            self.mail_street_type.as_deref(),
            self.mail_suffix.as_deref(),
        ])
    }

    /// Owner names joined with " | ", skipping nulls.
    pub fn owner_names(&self) -> String {
        self.owners
            .iter()
            .flatten()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// "street, city, zip" with missing parts dropped.
    pub fn display_address(&self) -> String {
        [
            self.prop_address.as_deref(),
            self.city.as_deref(),
            self.zip.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}
