//! Wire formats for calendar dates and times of day.
//!
//! Dates go out as `YYYY-MM-DD` and times as `HH:MM`. On input a date may
//! also be an RFC 3339 or ISO 8601 date-time, in which case the calendar day
//! in the value's own offset is used.

use time::{
    format_description::{
        well_known::{Iso8601, Rfc3339},
        BorrowedFormatItem,
    },
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime, Time,
};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_OUTPUT_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
const TIME_INPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute][optional [:[second]]]");

pub fn parse_calendar_date(value: &str) -> Result<Date, String> {
    let value = value.trim();
    if let Ok(date) = Date::parse(value, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(datetime) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(datetime.date());
    }
    // An unencoded `+` offset in a query string arrives as a space.
    if let Some((head, offset)) = value.rsplit_once(' ') {
        if let Ok(datetime) = OffsetDateTime::parse(&format!("{head}+{offset}"), &Rfc3339) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = PrimitiveDateTime::parse(value, &Iso8601::DEFAULT) {
        return Ok(datetime.date());
    }
    Err(format!("could not parse date: {value}"))
}

/// Seconds are accepted but dropped, so stored times match what goes out.
pub fn parse_time_of_day(value: &str) -> Result<Time, String> {
    let time = Time::parse(value.trim(), TIME_INPUT_FORMAT)
        .map_err(|_| format!("could not parse time '{}', expected HH:MM", value.trim()))?;
    Time::from_hms(time.hour(), time.minute(), 0).map_err(|e| e.to_string())
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

pub fn format_time_of_day(time: Time) -> String {
    time.format(TIME_OUTPUT_FORMAT)
        .unwrap_or_else(|_| format!("{:02}:{:02}", time.hour(), time.minute()))
}

/// `#[serde(with = "calendar_date")]` for `Date` fields.
pub mod calendar_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }

    /// Use with `#[serde(default)]`; an explicit null reads as absent.
    pub mod option {
        use serde::{Deserialize, Deserializer};
        use time::Date;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::super::parse_calendar_date(&raw))
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }
}

/// `#[serde(with = "time_of_day::option")]` for `Option<Time>` fields.
pub mod time_of_day {
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Time;

        pub fn serialize<S: Serializer>(
            time: &Option<Time>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => serializer.serialize_some(&super::super::format_time_of_day(*time)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Time>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::super::parse_time_of_day(&raw))
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }

    /// Distinguishes an absent field (`None`) from an explicit null
    /// (`Some(None)`). Use with `#[serde(default)]`.
    pub mod double_option {
        use serde::Deserializer;
        use time::Time;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Option<Time>>, D::Error> {
            super::option::deserialize(deserializer).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, time};

    use super::*;

    #[test]
    fn plain_dates_parse() {
        assert_eq!(parse_calendar_date("2024-05-01").unwrap(), date!(2024 - 05 - 01));
        assert_eq!(parse_calendar_date(" 2024-05-01 ").unwrap(), date!(2024 - 05 - 01));
    }

    #[test]
    fn datetimes_use_their_own_calendar_day() {
        assert_eq!(
            parse_calendar_date("2024-05-01T23:30:00+09:00").unwrap(),
            date!(2024 - 05 - 01)
        );
        assert_eq!(
            parse_calendar_date("2024-05-01T00:15:00Z").unwrap(),
            date!(2024 - 05 - 01)
        );
        assert_eq!(
            parse_calendar_date("2024-05-01T18:00:00").unwrap(),
            date!(2024 - 05 - 01)
        );
    }

    #[test]
    fn offset_with_decoded_plus_still_parses() {
        assert_eq!(
            parse_calendar_date("2024-05-01T23:30:00 09:00").unwrap(),
            date!(2024 - 05 - 01)
        );
        assert!(parse_calendar_date("2024-05-01 tomorrow").is_err());
    }

    #[test]
    fn invalid_dates_are_rejected() {
        for raw in ["", "2024-13-01", "01/05/2024", "tomorrow"] {
            assert!(parse_calendar_date(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn times_accept_seconds_but_keep_minute_precision() {
        assert_eq!(parse_time_of_day("09:00").unwrap(), time!(09:00));
        assert_eq!(parse_time_of_day("17:45:30").unwrap(), time!(17:45));
        assert_eq!(
            parse_time_of_day("09:00:10").unwrap(),
            parse_time_of_day("09:00:50").unwrap()
        );
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("9am").is_err());
    }

    #[test]
    fn output_is_zero_padded() {
        assert_eq!(format_date(date!(2024 - 01 - 05)), "2024-01-05");
        assert_eq!(format_time_of_day(time!(08:05:59)), "08:05");
    }
}
