//! ISO-8601 local date-time wire format, without zone.
//!
//! Rendered as `YYYY-MM-DDTHH:MM:SS`; parsing also accepts fractional seconds
//! and the minute-precision form `YYYY-MM-DDTHH:MM`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer, de};

/// Rendering format.
pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a local date-time in any accepted form.
///
/// # Errors
///
/// Returns the parse error of the minute-precision attempt when no form matches.
pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
}

/// Serde serializer for `#[serde(with = "timestamp")]`.
///
/// # Errors
///
/// Propagates serializer failures.
pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(FORMAT))
}

/// Serde deserializer for `#[serde(with = "timestamp")]`.
///
/// # Errors
///
/// Fails when the text is not an accepted local date-time.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|err| de::Error::custom(format!("invalid date-time {raw:?}: {err}")))
}
