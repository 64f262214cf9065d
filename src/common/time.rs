//! Canonical timestamp handling.
//!
//! Every timestamp crossing the storage boundary is UTC truncated to whole
//! milliseconds, and every timestamp leaving the API is rendered the same
//! way: RFC 3339, millisecond precision, `Z` suffix
//! (`2024-05-01T12:00:00.000Z`). Clients never have to patch separators
//! before parsing.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serializer;

use crate::error::{AppError, AppResult};

/// Naive layouts accepted on input, interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Truncate to the precision the store keeps.
#[must_use]
pub fn normalize(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

#[must_use]
pub fn now() -> DateTime<Utc> {
    normalize(Utc::now())
}

#[must_use]
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a client-supplied timestamp.
///
/// Accepts RFC 3339 with any offset, or a naive date-time separated by a
/// space or `T`, which is taken to be UTC.
///
/// # Errors
///
/// Returns `AppError::Validation` when no accepted layout matches.
pub fn parse(raw: &str) -> AppResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(normalize(ts.with_timezone(&Utc)));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .map(|naive| normalize(naive.and_utc()))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "invalid timestamp '{raw}' (expected RFC 3339 or 'YYYY-MM-DD HH:MM:SS')"
            ))
        })
}

/// `serialize_with` helper rendering the canonical form.
pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millis_and_z() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(format(&ts), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn parses_offsets_into_utc() {
        let ts = parse("2024-05-01T14:30:00+02:00").unwrap();
        assert_eq!(format(&ts), "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn parses_space_and_t_separated_naive_forms() {
        let spaced = parse("2024-05-01 12:00:00").unwrap();
        let with_t = parse("2024-05-01T12:00:00").unwrap();
        assert_eq!(spaced, with_t);

        let fractional = parse("2024-05-01 12:00:00.25").unwrap();
        assert_eq!(format(&fractional), "2024-05-01T12:00:00.250Z");
    }

    #[test]
    fn truncates_below_millisecond() {
        let ts = parse("2024-05-01T12:00:00.123456789Z").unwrap();
        assert_eq!(format(&ts), "2024-05-01T12:00:00.123Z");
        assert_eq!(normalize(ts), ts);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse("yesterday").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
