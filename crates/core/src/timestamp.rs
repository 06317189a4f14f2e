//! Timestamp normalization.
//!
//! Backends send dates as RFC 3339, as naive ISO-8601 (taken as UTC) or as
//! Unix epoch milliseconds. All of them become `DateTime<Utc>` and are written
//! back out as RFC 3339.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a textual timestamp in any accepted format.
#[must_use]
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Convert Unix epoch milliseconds.
#[must_use]
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Canonical string form.
#[must_use]
pub fn format(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Text(String),
    Millis(i64),
}

impl Raw {
    fn resolve<E: serde::de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            Self::Text(text) => {
                parse(&text).ok_or_else(|| E::custom(format!("invalid timestamp: {text}")))
            }
            Self::Millis(millis) => from_millis(millis)
                .ok_or_else(|| E::custom(format!("timestamp out of range: {millis}"))),
        }
    }
}

/// Serialize as RFC 3339.
pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(at))
}

/// Deserialize from any accepted representation.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    Raw::deserialize(deserializer)?.resolve()
}

/// Same as the parent module, for optional fields. `null` reads as `None`.
pub mod option {
    use super::{DateTime, Deserialize, Deserializer, Raw, Serializer, Utc};

    /// Serialize as RFC 3339 or `null`.
    pub fn serialize<S: Serializer>(
        at: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => super::serialize(at, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<Raw>::deserialize(deserializer)?
            .map(Raw::resolve)
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats_agree() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        assert_eq!(parse("2024-05-01T10:00:00Z"), Some(expected));
        assert_eq!(parse("2024-05-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse("2024-05-01T10:00:00"), Some(expected));
        assert_eq!(parse("2024-05-01T10:00:00.000"), Some(expected));
        assert_eq!(parse("2024-05-01 10:00:00"), Some(expected));
        assert_eq!(from_millis(1_714_557_600_000), Some(expected));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn test_format_canonical() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(format(&at), "2024-05-01T10:00:00.000Z");
    }
}
