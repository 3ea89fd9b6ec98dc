// src/analytics/mailing.rs

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::analytics::{required, EngineError, Lookup};
use crate::db::{Assignment, Field, ParcelStore, Predicate};
use crate::domain::address::{parse_mailing_address, Address};

/// Raw mailing address edit as submitted by a caller.
#[derive(Debug, Clone, Deserialize)]
pub struct MailingEdit {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailingUpdate {
    pub ok: bool,
    pub rows_affected: usize,
    pub mailing_address: Address,
}

/// Validates the edit, then rewrites every mailing field of the parcel's rows
/// in one transaction. Validation failures never reach the store.
#[instrument(skip(store))]
pub fn edit_mailing_address(
    store: &dyn ParcelStore,
    pin: &str,
    edit: &MailingEdit,
) -> Result<Lookup<MailingUpdate>, EngineError> {
    let pin = required("pin", pin)?;
    let address = parse_mailing_address(&edit.address, &edit.city, &edit.state, &edit.zip)?;

    let street = &address.street;
    let assignments = [
        Assignment::set(Field::MailStreetNumber, Some(street.street_number.clone())),
        Assignment::set(Field::MailDirection, street.direction.clone()),
        Assignment::set(Field::MailStreetName, Some(street.street_name.clone())),
        Assignment::set(Field::MailStreetType, street.street_type.clone()),
        Assignment::set(Field::MailSuffix, street.suffix.clone()),
        Assignment::set(Field::MailCity, Some(address.city.clone())),
        Assignment::set(Field::MailState, Some(address.state.clone())),
        Assignment::set(Field::MailZip5, Some(address.zip5.clone())),
        Assignment::set(Field::MailZip4, address.zip4.clone()),
    ];

    let rows_affected = store.update(&Predicate::matches(Field::Pin, pin), &assignments)?;
    if rows_affected == 0 {
        return Ok(Lookup::NotFound);
    }

    info!(pin, rows_affected, street = %address.street.to_line(), "mailing address updated");
    Ok(Lookup::Found(MailingUpdate {
        ok: true,
        rows_affected,
        mailing_address: address,
    }))
}
