// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use crate::types::JsonValue;

pub trait Request {
    fn push_filter(&mut self, filter: JsonValue);
    fn size(&mut self, size: u64);
    fn source_fields(&mut self, fields: &[String]);
    fn aggregation(&mut self, name: &str, aggregation: JsonValue);
}

impl Request for JsonValue {
    fn push_filter(&mut self, filter: JsonValue) {
        if let Some(filters) = self["query"]["bool"]["filter"].as_array_mut() {
            filters.push(filter);
        }
    }

    fn size(&mut self, size: u64) {
        self["size"] = size.into();
    }

    fn source_fields(&mut self, fields: &[String]) {
        self["_source"] = fields.into();
    }

    fn aggregation(&mut self, name: &str, aggregation: JsonValue) {
        self["aggs"][name] = aggregation;
    }
}

pub fn new_request() -> JsonValue {
    json!({
        "query": {
            "bool": {
                "filter": [],
            }
        }
    })
}

/// Range filter with an inclusive lower and exclusive upper bound.
pub fn range_filter(
    field: &str,
    gte: &str,
    lt: &str,
    format: Option<&str>,
    time_zone: Option<&str>,
) -> JsonValue {
    let mut range = json!({
        "gte": gte,
        "lt": lt,
    });
    if let Some(format) = format {
        range["format"] = format.into();
    }
    if let Some(time_zone) = time_zone {
        range["time_zone"] = time_zone.into();
    }
    json!({"range": {field: range}})
}

pub fn match_filter(field: &str, value: &str) -> JsonValue {
    json!({"match": {field: value}})
}

pub fn match_phrase_filter(field: &str, value: &str) -> JsonValue {
    json!({"match_phrase": {field: value}})
}

pub fn terms_filter(field: &str, values: &[String]) -> JsonValue {
    json!({"terms": {field: values}})
}

pub fn simple_query_string(query: &str, fields: &[String]) -> JsonValue {
    json!({
        "simple_query_string": {
            "query": query,
            "fields": fields,
        }
    })
}

pub fn terms_aggregation(field: &str, size: u64) -> JsonValue {
    json!({
        "terms": {
            "field": field,
            "size": size,
            "order": {
                "_count": "desc",
            }
        }
    })
}
