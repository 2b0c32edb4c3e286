// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use chrono::{FixedOffset, NaiveDate, SecondsFormat};
use regex::Regex;

pub type ChronoDateTime = chrono::DateTime<chrono::FixedOffset>;

#[derive(Debug)]
pub struct ParseError(String);

impl std::error::Error for ParseError {}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

lazy_static! {
    static ref PARTIAL_TIMESTAMP: Regex = Regex::new(concat!(
        r"^(\d{4})-?(\d{2})?-?(\d{2})?T?(\d{2})?:?(\d{2})?:?(\d{2})?",
        r"(\.(\d+))?(([+\-]\d{2}:?\d{2})|Z)?$",
    ))
    .unwrap();
    static ref OFFSET: Regex = Regex::new(r"^([+\-])(\d{2}):(\d{2})$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    pub datetime: ChronoDateTime,
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.datetime.to_rfc3339())
    }
}

impl DateTime {
    pub fn now() -> Self {
        DateTime {
            datetime: chrono::Utc::now().fixed_offset(),
        }
    }

    /// Format to an Elasticsearch style format
    ///
    /// RFC3339 style, UTC, with Z of the timezone.
    pub fn to_elastic(&self) -> String {
        self.datetime
            .to_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Wall clock time in the given offset, without the offset
    /// suffix. Used when Elasticsearch is told the time zone
    /// separately.
    pub fn to_wallclock(&self, offset: FixedOffset) -> String {
        self.datetime
            .with_timezone(&offset)
            .format("%Y-%m-%dT%H:%M:%S%.3f")
            .to_string()
    }

    /// Unix timestamp in milliseconds.
    pub fn to_millis(&self) -> i64 {
        self.datetime.timestamp_millis()
    }

    /// The calendar day in UTC.
    pub fn utc_date(&self) -> NaiveDate {
        self.datetime.to_utc().date_naive()
    }

    pub fn sub(&self, rhs: chrono::Duration) -> Self {
        let new = self.datetime - rhs;
        new.into()
    }
}

impl From<chrono::DateTime<chrono::FixedOffset>> for DateTime {
    fn from(datetime: chrono::DateTime<chrono::FixedOffset>) -> Self {
        DateTime { datetime }
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DateTime {
    fn from(datetime: chrono::DateTime<chrono::Utc>) -> Self {
        DateTime {
            datetime: datetime.fixed_offset(),
        }
    }
}

/// Parse a time zone offset in the form of +hh:mm or -hh:mm.
pub fn parse_offset(input: &str) -> Result<FixedOffset, ParseError> {
    let input = input.trim();
    let c = OFFSET.captures(input).ok_or_else(|| {
        ParseError(format!(
            "{input} is an invalid timezone format, expect +/-hh:mm"
        ))
    })?;
    let hours: i32 = c[2].parse().map_err(|_| ParseError(input.to_string()))?;
    let minutes: i32 = c[3].parse().map_err(|_| ParseError(input.to_string()))?;
    let mut seconds = hours * 3600 + minutes * 60;
    if &c[1] == "-" {
        seconds = -seconds;
    }
    FixedOffset::east_opt(seconds)
        .ok_or_else(|| ParseError(format!("offset out of range: {input}")))
}

/// Parse a full or partial timestamp. Any missing components are
/// filled in with their lowest value, a missing offset is taken
/// from `tz_offset`, or UTC if not provided.
pub fn parse(input: &str, tz_offset: Option<&str>) -> Result<DateTime, ParseError> {
    let input = input.trim();

    // First attempt to parse it as is.
    if let Ok(ts) = input.parse::<chrono::DateTime<chrono::FixedOffset>>() {
        return Ok(ts.into());
    }

    let default_tz = tz_offset.unwrap_or("Z");

    if let Some(c) = PARTIAL_TIMESTAMP.captures(input) {
        let year = c.get(1).map_or("", |m| m.as_str());
        let month = c.get(2).map_or("01", |m| m.as_str());
        let day = c.get(3).map_or("01", |m| m.as_str());
        let hour = c.get(4).map_or("00", |m| m.as_str());
        let minute = c.get(5).map_or("00", |m| m.as_str());
        let second = c.get(6).map_or("00", |m| m.as_str());
        let subs = c.get(8).map_or("0", |m| m.as_str());
        let offset = c.get(9).map_or(default_tz, |m| m.as_str());

        let fixed = format!("{year}-{month}-{day}T{hour}:{minute}:{second}.{subs}{offset}");

        // Try again.
        if let Ok(ts) = fixed.parse::<chrono::DateTime<chrono::FixedOffset>>() {
            return Ok(ts.into());
        }
    }

    Err(ParseError(format!("invalid timestamp: {input}")))
}

/// Parse a date only, YYYY-MM-DD.
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        ParseError(format!(
            "{} is an invalid date format, expect YYYY-mm-dd",
            input.trim()
        ))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_elastic() {
        let s = "2024-05-17T15:34:08.828074-06:00";
        let dt = s.parse::<chrono::DateTime<chrono::FixedOffset>>().unwrap();
        let dt = super::DateTime::from(dt);
        assert_eq!(dt.to_elastic(), "2024-05-17T21:34:08.828Z");
    }

    #[test]
    fn test_to_wallclock() {
        let dt = parse("2024-05-17T21:34:08.828Z", None).unwrap();
        let offset = parse_offset("-04:00").unwrap();
        assert_eq!(dt.to_wallclock(offset), "2024-05-17T17:34:08.828");
    }

    #[test]
    fn test_to_millis() {
        let dt = parse("1970-01-01T00:00:01.500Z", None).unwrap();
        assert_eq!(dt.to_millis(), 1500);
    }

    #[test]
    fn test_utc_date() {
        let dt = parse("2024-05-16T22:30:00-04:00", None).unwrap();
        assert_eq!(dt.utc_date().to_string(), "2024-05-17");
    }

    #[test]
    fn test_parse() {
        let ts0 = parse("2024-05-16T16:08:17.876423-0600", None).unwrap();
        let ts1 = parse("20240516T160817.876423-0600", None).unwrap();
        assert_eq!(ts0, ts1);

        let _ts = parse("2023-01-01T01:02:00.0+0000", None).unwrap();
        let _ts = parse("2024-05-16T16:08:17.876423Z", None).unwrap();
        let _ts = parse("2024", None).unwrap();
        let _ts = parse("2024-05-16", None).unwrap();
        let _ts = parse("2024-05-16T16:08", None).unwrap();
        let _ts = parse("2024-05-16T16:08:17", None).unwrap();

        assert!(parse("yesterday", None).is_err());
    }

    #[test]
    fn test_parse_default_offset() {
        let ts = parse("2024-05-16T16:08:17", Some("-04:00")).unwrap();
        assert_eq!(ts.to_elastic(), "2024-05-16T20:08:17.000Z");
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(
            parse_offset("-04:00").unwrap(),
            FixedOffset::west_opt(4 * 3600).unwrap()
        );
        assert_eq!(
            parse_offset("+05:30").unwrap(),
            FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
        );
        assert!(parse_offset("0400").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-05-16").unwrap().to_string(), "2024-05-16");
        assert!(parse_date("16/05/2024").is_err());
    }
}
