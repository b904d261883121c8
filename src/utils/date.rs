use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Fixed-width RFC 3339 text (`YYYY-MM-DDTHH:MM:SS.mmmZ`).
///
/// Every timestamp in the store uses this form, so comparing two stored
/// values as strings gives the same answer as comparing them as instants.
pub fn to_store(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn from_store(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse the textual forms a client may send for an entry date.
///
/// - RFC 3339 date-time (`2025-03-04T10:00:00.000Z`, `2025-03-04T10:00:00+02:00`)
/// - plain date (`2025-03-04`), read as UTC midnight
/// - date-time without offset (`2025-03-04T10:00`, `2025-03-04T10:00:00.5`), read as UTC
pub fn parse_wire_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc())
}

pub fn serialize_utc<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_store(dt))
}
