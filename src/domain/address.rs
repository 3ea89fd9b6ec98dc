// src/domain/address.rs

use serde::Serialize;
use thiserror::Error;

use crate::domain::normalize::normalize;

pub const DIRECTIONS: &[&str] = &["N", "S", "E", "W", "NE", "NW", "SE", "SW"];

pub const UNIT_WORDS: &[&str] = &["APT", "UNIT", "SUITE", "STE", "FL", "BLDG"];

pub const STREET_TYPES: &[&str] = &[
    "ST", "AVE", "BLVD", "RD", "LN", "DR", "CT", "PL", "PKWY", "WAY", "CIR", "HWY", "TER", "TRL",
    "RUN", "SQ", "CV", "CTX", "EXPY", "FWY", "PIKE",
];

/// Long street-suffix words and their abbreviations, as they appear in the
/// assessor's property address column.
const SUFFIX_ABBREVIATIONS: &[(&str, &str)] = &[
    ("STREET", "ST"),
    ("AVENUE", "AVE"),
    ("BOULEVARD", "BLVD"),
    ("ROAD", "RD"),
    ("LANE", "LN"),
    ("DRIVE", "DR"),
    ("COURT", "CT"),
    ("PLACE", "PL"),
    ("PARKWAY", "PKWY"),
    ("CIRCLE", "CIR"),
    ("HIGHWAY", "HWY"),
    ("TERRACE", "TER"),
    ("TRAIL", "TRL"),
    ("SQUARE", "SQ"),
    ("COVE", "CV"),
    ("EXPRESSWAY", "EXPY"),
    ("FREEWAY", "FWY"),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("invalid street number: expected digits with an optional letter, got {0:?}")]
    InvalidStreetNumber(String),
    #[error("invalid street type: {0:?} is not a recognized street type")]
    InvalidStreetType(String),
    #[error("missing street name")]
    InvalidStreetName,
    #[error("invalid zip code {0:?}: expected 12345 or 12345-6789")]
    InvalidZip(String),
    #[error("missing city")]
    InvalidCity,
    #[error("invalid state {0:?}: expected a two-letter code")]
    InvalidState(String),
}

/// The street line of an address: everything before city/state/zip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreetLine {
    pub street_number: String,
    pub direction: Option<String>,
    pub street_name: String,
    pub street_type: Option<String>,
    pub suffix: Option<String>,
}

impl StreetLine {
    /// Renders back to a single normalized line that parses to the same fields.
    pub fn to_line(&self) -> String {
        [
            Some(self.street_number.as_str()),
            self.direction.as_deref(),
            Some(self.street_name.as_str()),
            self.street_type.as_deref(),
            self.suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    #[serde(flatten)]
    pub street: StreetLine,
    pub city: String,
    pub state: String,
    pub zip5: String,
    pub zip4: Option<String>,
}

fn is_street_number(token: &str) -> bool {
    let digits = token.chars().take_while(|c| c.is_ascii_digit()).count();
    let rest: Vec<char> = token.chars().skip(digits).collect();
    digits > 0 && (rest.is_empty() || (rest.len() == 1 && rest[0].is_ascii_alphabetic()))
}

/// Parses a raw street line with a fixed-order grammar:
/// number, direction?, (name...), type, suffix?.
///
/// Type and suffix are taken from the back before the remaining tokens
/// become the name, so "PARK AVE" never swallows "AVE" into the name.
pub fn parse_street_line(raw: &str) -> Result<StreetLine, AddressError> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Err(AddressError::Empty);
    }
    let mut tokens: Vec<&str> = normalized.split(' ').collect();

    // 1. street number
    let number = tokens.remove(0);
    if !is_street_number(number) {
        return Err(AddressError::InvalidStreetNumber(number.to_string()));
    }

    // 2. direction
    let direction = if tokens.first().is_some_and(|t| DIRECTIONS.contains(t)) {
        Some(tokens.remove(0).to_string())
    } else {
        None
    };

    // 3. unit suffix, either "APT" or "APT 4"; "FL ST" is a name and a type
    let n = tokens.len();
    let suffix = if n >= 1 && UNIT_WORDS.contains(&tokens[n - 1]) {
        tokens.pop().map(str::to_string)
    } else if n >= 2
        && UNIT_WORDS.contains(&tokens[n - 2])
        && !STREET_TYPES.contains(&tokens[n - 1])
    {
        let joined = format!("{} {}", tokens[n - 2], tokens[n - 1]);
        tokens.truncate(n - 2);
        Some(joined)
    } else {
        None
    };

    // 4. street type
    let street_type = match tokens.last().copied() {
        Some(t) if STREET_TYPES.contains(&t) => {
            tokens.pop();
            Some(t.to_string())
        }
        Some(t) => return Err(AddressError::InvalidStreetType(t.to_string())),
        None => return Err(AddressError::InvalidStreetType(String::new())),
    };

    // 5. name
    if tokens.is_empty() {
        return Err(AddressError::InvalidStreetName);
    }

    Ok(StreetLine {
        street_number: number.to_string(),
        direction,
        street_name: tokens.join(" "),
        street_type,
        suffix,
    })
}

/// Splits "12345" or "12345-6789" into its parts.
pub fn parse_zip(raw: &str) -> Result<(String, Option<String>), AddressError> {
    let zip = raw.trim();
    let bad = || AddressError::InvalidZip(zip.to_string());
    let all_digits = |s: &str, n: usize| s.len() == n && s.chars().all(|c| c.is_ascii_digit());

    let mut parts = zip.split('-');
    let zip5 = parts.next().unwrap_or_default();
    let zip4 = parts.next();
    if parts.next().is_some() || !all_digits(zip5, 5) {
        return Err(bad());
    }
    match zip4 {
        None => Ok((zip5.to_string(), None)),
        Some(ext) if all_digits(ext, 4) => Ok((zip5.to_string(), Some(ext.to_string()))),
        Some(_) => Err(bad()),
    }
}

/// Validates a full mailing address edit. Fails before anything touches the store.
pub fn parse_mailing_address(
    raw_address: &str,
    city: &str,
    state: &str,
    zip: &str,
) -> Result<Address, AddressError> {
    let street = parse_street_line(raw_address)?;

    let city = normalize(city);
    if city.is_empty() {
        return Err(AddressError::InvalidCity);
    }

    let state = normalize(state);
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AddressError::InvalidState(state));
    }

    let (zip5, zip4) = parse_zip(zip)?;

    Ok(Address {
        street,
        city,
        state,
        zip5,
        zip4,
    })
}

/// Best-effort rewrite of a trailing long suffix word ("STREET" -> "ST") so a
/// free-text address can match the abbreviated assessor column. Lossy for
/// condo and multi-unit addresses.
pub fn abbreviate_street_suffix(address: &str) -> String {
    let normalized = normalize(address);
    let mut tokens: Vec<&str> = normalized.split(' ').collect();
    if let Some(last) = tokens.last_mut() {
        if let Some((_, abbr)) = SUFFIX_ABBREVIATIONS.iter().find(|(long, _)| *long == *last) {
            *last = *abbr;
        }
    }
    tokens.join(" ")
}
