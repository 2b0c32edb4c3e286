// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::error::CheckError;
use crate::types::JsonValue;

/// What came back from sending a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Reply(HttpReply),
    /// No HTTP response at all: connection refused, timeout, DNS...
    TransportFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Only 2xx is success, a redirect is not a search result.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Bucket {
    pub key: JsonValue,
    pub doc_count: u64,
}

impl Bucket {
    pub fn key_string(&self) -> String {
        match &self.key {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// A successful, well formed search response body.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    payload: JsonValue,
}

impl SearchResponse {
    pub fn from_reply(reply: &HttpReply) -> Result<Self, CheckError> {
        if !reply.is_success() {
            return Err(CheckError::MalformedResponse(format!(
                "status {}: {}",
                reply.status, reply.body
            )));
        }
        let payload: JsonValue = serde_json::from_str(&reply.body)
            .map_err(|_| CheckError::MalformedResponse(reply.body.clone()))?;
        match &payload {
            JsonValue::Object(map) if !map.is_empty() => Ok(Self { payload }),
            _ => Err(CheckError::MalformedResponse(reply.body.clone())),
        }
    }

    /// `hits.total`, either a plain number or `{"value": n}` as
    /// returned by Elasticsearch 7 and later.
    pub fn total_hits(&self) -> Result<u64, CheckError> {
        let total = &self.payload["hits"]["total"];
        let total = match total {
            JsonValue::Object(_) => &total["value"],
            _ => total,
        };
        match total {
            JsonValue::Number(n) => n.as_u64().ok_or_else(|| self.malformed()),
            _ => Err(self.malformed()),
        }
    }

    /// The returned hits, in response order.
    pub fn hits(&self) -> &[JsonValue] {
        self.payload["hits"]["hits"]
            .as_array()
            .map(|hits| hits.as_slice())
            .unwrap_or(&[])
    }

    /// Buckets of the named aggregation. `Ok(None)` if the response
    /// has no such aggregation.
    pub fn buckets(&self, name: &str) -> Result<Option<Vec<Bucket>>, CheckError> {
        let buckets = &self.payload["aggregations"][name]["buckets"];
        if buckets.is_null() {
            return Ok(None);
        }
        let buckets: Vec<Bucket> =
            serde_json::from_value(buckets.clone()).map_err(|_| self.malformed())?;
        Ok(Some(buckets))
    }

    fn malformed(&self) -> CheckError {
        CheckError::MalformedResponse(self.payload.to_string())
    }
}
