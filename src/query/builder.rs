// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use chrono::NaiveDate;
use tracing::debug;

use super::filter::{FilterSpec, MatchKind};
use super::{IndexSelector, TimeWindow};
use crate::datetime::{self, DateTime};
use crate::elastic::request::{self, Request};
use crate::error::CheckError;
use crate::types::{JsonMap, JsonValue};

pub const DEFAULT_TIME_FIELD: &str = "@timestamp";
pub const DEFAULT_SIZE: u64 = 10;

pub const PARAM_GTE: &str = "gte_timestamp";
pub const PARAM_LT: &str = "lt_timestamp";
pub const PARAM_TIME_ZONE: &str = "time_zone";
pub const PARAM_QUERY: &str = "query";

/// How the window bounds are written into the range clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampEncoding {
    /// RFC3339 in UTC, or wall clock time if a time zone is set.
    #[default]
    Iso8601,
    /// Milliseconds since the epoch, with `"format": "epoch_millis"`.
    EpochMillis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// POST to `_search/template` with the query as the template
    /// source and the bound values as parameters.
    #[default]
    Template,
    /// POST to `_search` with the bound values substituted.
    Direct,
}

/// Terms aggregation used by the bucket counting checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub name: String,
    pub field: String,
    pub size: u64,
}

/// Per check choices that don't depend on the user's filters.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub encoding: TimestampEncoding,
    pub mode: RequestMode,
    pub time_field: String,
    pub time_zone: Option<String>,
    pub size: u64,
    pub source_fields: Vec<String>,
    pub aggregation: Option<Aggregation>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            encoding: TimestampEncoding::default(),
            mode: RequestMode::default(),
            time_field: DEFAULT_TIME_FIELD.to_string(),
            time_zone: None,
            size: DEFAULT_SIZE,
            source_fields: Vec::new(),
            aggregation: None,
        }
    }
}

/// A fully built search, ready to be sent once.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    window: TimeWindow,
    indices: IndexSelector,
    index_type: Option<String>,
    mode: RequestMode,
    query: JsonValue,
    params: JsonMap,
}

impl SearchRequest {
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn indices(&self) -> &IndexSelector {
        &self.indices
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// The query with `{{placeholders}}` for the bound parameters.
    pub fn query(&self) -> &JsonValue {
        &self.query
    }

    pub fn params(&self) -> &JsonMap {
        &self.params
    }

    /// Path relative to the Elasticsearch URL.
    pub fn path(&self) -> String {
        let mut path = self.indices.to_string();
        if let Some(index_type) = &self.index_type {
            path.push('/');
            path.push_str(index_type);
        }
        match self.mode {
            RequestMode::Template => path.push_str("/_search/template"),
            RequestMode::Direct => path.push_str("/_search"),
        }
        path
    }

    /// The body to POST to `path()`.
    pub fn body(&self) -> JsonValue {
        match self.mode {
            RequestMode::Template => json!({
                "source": self.query,
                "params": self.params,
            }),
            RequestMode::Direct => self.rendered(),
        }
    }

    /// The query with all placeholders replaced by their values.
    pub fn rendered(&self) -> JsonValue {
        render(&self.query, &self.params)
    }
}

fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

fn render(value: &JsonValue, params: &JsonMap) -> JsonValue {
    match value {
        JsonValue::String(s) => {
            let name = s
                .strip_prefix("{{")
                .and_then(|s| s.strip_suffix("}}"))
                .map(str::trim);
            match name.and_then(|name| params.get(name)) {
                Some(value) => value.clone(),
                None => value.clone(),
            }
        }
        JsonValue::Array(items) => {
            JsonValue::Array(items.iter().map(|item| render(item, params)).collect())
        }
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render(v, params)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Builds a `SearchRequest` from the window, index and filters.
///
/// Every call to `build` produces a fresh request, nothing is shared
/// between builds.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    config: QueryConfig,
    index: String,
    index_type: Option<String>,
    minutes: u32,
    reference: Option<DateTime>,
    index_days: Option<(NaiveDate, Vec<i64>)>,
    filters: FilterSpec,
}

impl QueryBuilder {
    pub fn new(index: &str, minutes: u32) -> Self {
        Self {
            config: QueryConfig::default(),
            index: index.to_string(),
            index_type: None,
            minutes,
            reference: None,
            index_days: None,
            filters: FilterSpec::default(),
        }
    }

    pub fn config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn index_type(mut self, index_type: Option<&str>) -> Self {
        self.index_type = index_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);
        self
    }

    /// End the window at a fixed time instead of now.
    pub fn reference_time(mut self, reference: Option<DateTime>) -> Self {
        self.reference = reference;
        self
    }

    /// Also search the indices for `anchor + offset` days.
    pub fn index_days(mut self, anchor: NaiveDate, offsets: Vec<i64>) -> Self {
        self.index_days = Some((anchor, offsets));
        self
    }

    pub fn filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    pub fn build(&self) -> Result<SearchRequest, CheckError> {
        let window = TimeWindow::new(self.reference, self.minutes)?;

        let indices = match &self.index_days {
            Some((anchor, offsets)) => {
                IndexSelector::with_day_offsets(&self.index, &window, *anchor, offsets)?
            }
            None => IndexSelector::for_window(&self.index, &window)?,
        };

        let time_zone = match &self.config.time_zone {
            Some(tz) => Some(datetime::parse_offset(tz)?),
            None => None,
        };

        let mut params = JsonMap::new();
        let (gte, lt, format) = match self.config.encoding {
            TimestampEncoding::Iso8601 => match time_zone {
                Some(offset) => (
                    window.start.to_wallclock(offset),
                    window.end.to_wallclock(offset),
                    None,
                ),
                None => (window.start.to_elastic(), window.end.to_elastic(), None),
            },
            TimestampEncoding::EpochMillis => (
                window.start.to_millis().to_string(),
                window.end.to_millis().to_string(),
                Some("epoch_millis"),
            ),
        };
        params.insert(PARAM_GTE.to_string(), gte.into());
        params.insert(PARAM_LT.to_string(), lt.into());

        // An epoch is absolute, a time zone would be ignored.
        let time_zone_placeholder = match (&self.config.time_zone, self.config.encoding) {
            (Some(tz), TimestampEncoding::Iso8601) => {
                params.insert(PARAM_TIME_ZONE.to_string(), tz.trim().into());
                Some(placeholder(PARAM_TIME_ZONE))
            }
            _ => None,
        };

        let mut query = request::new_request();
        query.push_filter(request::range_filter(
            &self.config.time_field,
            &placeholder(PARAM_GTE),
            &placeholder(PARAM_LT),
            format,
            time_zone_placeholder.as_deref(),
        ));

        if let Some(clause) = &self.filters.raw_clause {
            match clause {
                JsonValue::Object(map) if !map.is_empty() => query.push_filter(clause.clone()),
                _ => {
                    return Err(CheckError::InvalidClause(format!(
                        "clause must be a non-empty JSON object: {clause}"
                    )));
                }
            }
        }

        if let Some(simple) = &self.filters.simple_query {
            if simple.fields.is_empty() {
                return Err(CheckError::InvalidInput(
                    "a simple query requires at least one field".to_string(),
                ));
            }
            params.insert(PARAM_QUERY.to_string(), simple.query.clone().into());
            query.push_filter(request::simple_query_string(
                &placeholder(PARAM_QUERY),
                &simple.fields,
            ));
        }

        for (field, value) in &self.filters.matches {
            let clause = match self.filters.match_kind {
                MatchKind::Match => request::match_filter(field, value),
                MatchKind::Phrase => request::match_phrase_filter(field, value),
                MatchKind::Term => request::terms_filter(field, &[value.clone()]),
            };
            query.push_filter(clause);
        }

        if let Some(severity) = &self.filters.severity {
            if severity.labels.is_empty() {
                return Err(CheckError::InvalidInput(
                    "at least one severity label is required".to_string(),
                ));
            }
            query.push_filter(request::terms_filter(&severity.field, &severity.labels));
        }

        query.size(self.config.size);
        if !self.config.source_fields.is_empty() {
            query.source_fields(&self.config.source_fields);
        }
        if let Some(agg) = &self.config.aggregation {
            query.aggregation(&agg.name, request::terms_aggregation(&agg.field, agg.size));
        }

        let request = SearchRequest {
            window,
            indices,
            index_type: self.index_type.clone(),
            mode: self.config.mode,
            query,
            params,
        };
        debug!(
            "Built search request: path={}, window={} to {}",
            request.path(),
            request.window.start,
            request.window.end
        );
        Ok(request)
    }
}
