// src/domain/occupancy.rs

use serde::Serialize;

use crate::domain::parcel::ParcelRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyType {
    OwnerOccupied,
    Rental,
    Commercial,
}

impl OccupancyType {
    /// Reporting order.
    pub const ALL: [OccupancyType; 3] = [
        OccupancyType::OwnerOccupied,
        OccupancyType::Rental,
        OccupancyType::Commercial,
    ];
}

/// Total over every row. Precedence: a non-blank ownership code always means
/// commercial; then a blank or matching mailing address means owner-occupied.
pub fn classify(parcel: &ParcelRow) -> OccupancyType {
    if parcel
        .ownership_code
        .as_deref()
        .is_some_and(|code| !code.trim().is_empty())
    {
        return OccupancyType::Commercial;
    }

    let mailing = parcel.mailing_key();
    if mailing.is_empty() || mailing == parcel.property_key() {
        OccupancyType::OwnerOccupied
    } else {
        OccupancyType::Rental
    }
}
