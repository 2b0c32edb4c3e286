// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::TimeWindow;
use crate::error::CheckError;

/// The daily indices a search has to cover, as `<base>-YYYY.MM.DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSelector {
    indices: Vec<String>,
}

impl IndexSelector {
    /// One index per UTC calendar day touched by the window.
    pub fn for_window(base: &str, window: &TimeWindow) -> Result<Self, CheckError> {
        Self::build(base, window, None, &[])
    }

    /// Like `for_window`, but also includes `anchor + offset` days for
    /// each of the offsets. Used by checks that always look back a day
    /// regardless of the window.
    pub fn with_day_offsets(
        base: &str,
        window: &TimeWindow,
        anchor: NaiveDate,
        offsets: &[i64],
    ) -> Result<Self, CheckError> {
        Self::build(base, window, Some(anchor), offsets)
    }

    fn build(
        base: &str,
        window: &TimeWindow,
        anchor: Option<NaiveDate>,
        offsets: &[i64],
    ) -> Result<Self, CheckError> {
        let base = base.trim();
        if base.is_empty() {
            return Err(CheckError::InvalidInput(
                "index name must not be empty".to_string(),
            ));
        }

        // Already a pattern, leave it to Elasticsearch.
        if base.contains('*') {
            return Ok(Self {
                indices: vec![base.to_string()],
            });
        }

        let mut days = BTreeSet::new();
        let last = window.end.utc_date();
        let mut day = window.start.utc_date();
        while day <= last {
            days.insert(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        if let Some(anchor) = anchor {
            for offset in offsets {
                let day = chrono::Duration::try_days(*offset)
                    .and_then(|delta| anchor.checked_add_signed(delta))
                    .ok_or_else(|| {
                        CheckError::InvalidInput(format!(
                            "index day offset out of range: {offset}"
                        ))
                    })?;
                days.insert(day);
            }
        }

        let indices = days
            .iter()
            .map(|day| format!("{}-{}", base, day.format("%Y.%m.%d")))
            .collect();
        Ok(Self { indices })
    }

    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl std::fmt::Display for IndexSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.indices.join(","))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datetime;

    fn window(end: &str, minutes: u32) -> TimeWindow {
        TimeWindow::new(Some(datetime::parse(end, None).unwrap()), minutes).unwrap()
    }

    #[test]
    fn test_single_day() {
        let selector =
            IndexSelector::for_window("logstash", &window("2024-05-17T12:00:00Z", 60)).unwrap();
        assert_eq!(selector.indices(), &["logstash-2024.05.17".to_string()]);
        assert_eq!(selector.to_string(), "logstash-2024.05.17");
    }

    #[test]
    fn test_spans_midnight() {
        let selector =
            IndexSelector::for_window("logstash", &window("2024-05-17T00:05:00Z", 10)).unwrap();
        assert_eq!(
            selector.to_string(),
            "logstash-2024.05.16,logstash-2024.05.17"
        );
    }

    #[test]
    fn test_full_day_window() {
        // 1440 minutes ending mid day touches exactly two days.
        let selector =
            IndexSelector::for_window("log", &window("2024-03-01T06:00:00Z", 1440)).unwrap();
        assert_eq!(selector.to_string(), "log-2024.02.29,log-2024.03.01");
    }

    #[test]
    fn test_one_index_per_day() {
        for minutes in [1, 7, 59, 60, 61, 719, 720, 1439, 1440] {
            let w = window("2024-05-17T00:30:00Z", minutes);
            let selector = IndexSelector::for_window("log", &w).unwrap();
            let expected = if w.start.utc_date() == w.end.utc_date() { 1 } else { 2 };
            assert_eq!(selector.len(), expected, "minutes={minutes}");

            // Rebuilding gives the same selector.
            assert_eq!(selector, IndexSelector::for_window("log", &w).unwrap());
        }
    }

    #[test]
    fn test_day_offsets() {
        let w = window("2024-05-17T12:00:00Z", 5);
        let anchor = datetime::parse_date("2024-05-17").unwrap();
        let selector = IndexSelector::with_day_offsets("syslog", &w, anchor, &[0, -1]).unwrap();
        assert_eq!(selector.to_string(), "syslog-2024.05.16,syslog-2024.05.17");
    }

    #[test]
    fn test_day_offset_out_of_range() {
        let w = window("2024-05-17T12:00:00Z", 5);
        let anchor = datetime::parse_date("2024-05-17").unwrap();
        for offset in [200_000_000_000_000, i64::MIN, 100_000_000] {
            let err =
                IndexSelector::with_day_offsets("syslog", &w, anchor, &[offset]).unwrap_err();
            assert!(matches!(err, CheckError::InvalidInput(_)), "offset={offset}");
        }
    }

    #[test]
    fn test_pattern_passthrough() {
        let selector =
            IndexSelector::for_window("logstash-*", &window("2024-05-17T00:05:00Z", 10)).unwrap();
        assert_eq!(selector.to_string(), "logstash-*");
    }

    #[test]
    fn test_empty_base() {
        assert!(IndexSelector::for_window(" ", &window("2024-05-17T00:05:00Z", 10)).is_err());
    }
}
