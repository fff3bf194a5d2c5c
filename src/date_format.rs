//! Parsing and serialization of calendar dates sent over the API.
//!
//! Dates are written as "YYYY-MM-DD". Clients may also send an RFC 3339
//! date-time such as "2025-01-15T10:30:00.000Z", in which case its UTC
//! calendar date is used.

use time::{
    Date, OffsetDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::Error;

/// Date format for the API, e.g. "2025-01-15".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a date from either "YYYY-MM-DD" or an RFC 3339 date-time.
///
/// # Errors
///
/// Returns an [Error::InvalidDate] if `text` matches neither format.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let text = text.trim();

    if let Ok(date) = Date::parse(text, DATE_FORMAT) {
        return Ok(date);
    }

    OffsetDateTime::parse(text, &Rfc3339)
        .map(|date_time| date_time.to_offset(UtcOffset::UTC).date())
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Serde helpers for `#[serde(with = "crate::date_format")]` on [Date] fields.
pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// See [serialize].
pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = <String as serde::Deserialize>::deserialize(deserializer)?;
    parse_date(&text).map_err(serde::de::Error::custom)
}
