//! Time-of-day helpers for `"HH:MM"` schedule fields.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Parses a 24h `"HH:MM"` time of day.
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
}

/// Minute of the day (0..1440) for a time of day.
pub fn minute_of_day(time: &impl Timelike) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Minutes from `now` until `time` on the same day.
///
/// Only hour and minute are compared. A time that is earlier in the day than
/// `now` yields a negative value even if it is meant for the next morning;
/// there is no midnight wraparound.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use depot_orchestrator::fleet::time::{minutes_until, parse_hhmm};
///
/// let now = NaiveDate::from_ymd_opt(2025, 1, 15)
///     .and_then(|d| d.and_hms_opt(4, 0, 0))
///     .expect("valid timestamp");
/// let departure = parse_hhmm("06:15").expect("valid time");
/// assert_eq!(minutes_until(departure, now), 135);
/// ```
pub fn minutes_until(time: NaiveTime, now: NaiveDateTime) -> i64 {
    minute_of_day(&time) - minute_of_day(&now)
}

/// Serde adapter storing a [`NaiveTime`] as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw)
            .map_err(|e| de::Error::custom(format!("invalid time \"{raw}\", expected HH:MM: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn parses_zero_padded_times() {
        let t = parse_hhmm("06:05").expect("should parse");
        assert_eq!((t.hour(), t.minute()), (6, 5));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_hhmm("6h15").is_err());
        assert!(parse_hhmm("25:00").is_err());
    }

    #[test]
    fn passed_departure_is_negative() {
        let dep = parse_hhmm("05:00").expect("should parse");
        assert_eq!(minutes_until(dep, at(5, 30)), -30);
    }

    #[test]
    fn no_wraparound_after_midnight() {
        let dep = parse_hhmm("00:30").expect("should parse");
        assert!(minutes_until(dep, at(23, 50)) < 0);
    }
}
