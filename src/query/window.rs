// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use crate::datetime::DateTime;
use crate::error::CheckError;

pub const MIN_WINDOW_MINUTES: u32 = 1;
pub const MAX_WINDOW_MINUTES: u32 = 1440;

/// The relative time range being searched, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime,
    pub end: DateTime,
    minutes: u32,
}

impl TimeWindow {
    /// A window of `minutes` ending at `end`, or now if no end is
    /// given.
    pub fn new(end: Option<DateTime>, minutes: u32) -> Result<Self, CheckError> {
        validate_minutes(minutes)?;
        let end = end.unwrap_or_else(DateTime::now);
        let start = end.sub(chrono::Duration::minutes(minutes as i64));
        Ok(Self {
            start,
            end,
            minutes,
        })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

pub fn validate_minutes(minutes: u32) -> Result<u32, CheckError> {
    if !(MIN_WINDOW_MINUTES..=MAX_WINDOW_MINUTES).contains(&minutes) {
        return Err(CheckError::InvalidInput(format!(
            "{minutes} is an invalid search time range. Valid values are between \
             {MIN_WINDOW_MINUTES} and {MAX_WINDOW_MINUTES} (1 day) minutes."
        )));
    }
    Ok(minutes)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datetime;

    #[test]
    fn test_window_bounds() {
        let end = datetime::parse("2024-05-17T00:05:00Z", None).unwrap();
        let window = TimeWindow::new(Some(end), 10).unwrap();
        assert_eq!(window.end, end);
        assert_eq!(window.start.to_elastic(), "2024-05-16T23:55:00.000Z");
        assert!(window.start <= window.end);
        assert_eq!(window.minutes(), 10);
    }

    #[test]
    fn test_window_limits() {
        assert!(TimeWindow::new(None, 0).is_err());
        assert!(TimeWindow::new(None, 1441).is_err());
        assert!(TimeWindow::new(None, 1).is_ok());
        assert!(TimeWindow::new(None, 1440).is_ok());
    }

    #[test]
    fn test_window_defaults_to_now() {
        let before = DateTime::now();
        let window = TimeWindow::new(None, 5).unwrap();
        assert!(window.end >= before);
    }
}
