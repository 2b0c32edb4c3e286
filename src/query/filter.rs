// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::path::Path;

use indexmap::IndexMap;

use crate::error::CheckError;
use crate::types::JsonValue;

/// Field name to value, in the order given by the user.
pub type MatchPairs = IndexMap<String, String>;

/// Free text query run against a list of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleQuery {
    pub query: String,
    pub fields: Vec<String>,
}

impl SimpleQuery {
    /// Fields are given as a comma separated list.
    pub fn new(query: &str, fields: &str) -> Self {
        Self {
            query: query.to_string(),
            fields: split_list(fields),
        }
    }
}

/// Only accept events with one of the labels in `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityFilter {
    pub field: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchKind {
    /// Analyzed match, any term may match.
    #[default]
    Match,
    /// All terms must appear in order.
    Phrase,
    /// The exact value, not analyzed.
    Term,
}

/// The optional constraints of a search. Everything present is ANDed
/// with the time range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub raw_clause: Option<JsonValue>,
    pub simple_query: Option<SimpleQuery>,
    pub matches: MatchPairs,
    pub match_kind: MatchKind,
    pub severity: Option<SeverityFilter>,
}

/// Parse a match list of the form `field1:value1,field2:value2`.
///
/// An empty list is accepted and yields no matches.
pub fn parse_match_list(input: &str) -> Result<MatchPairs, CheckError> {
    let mut pairs = MatchPairs::new();
    if input.trim().is_empty() {
        return Ok(pairs);
    }
    for item in input.split(',') {
        let parts: Vec<&str> = item.split(':').collect();
        match parts.as_slice() {
            [field, value] if !field.trim().is_empty() => {
                pairs.insert(field.trim().to_string(), value.trim().to_string());
            }
            _ => {
                return Err(CheckError::InvalidInput(format!(
                    "{input} is an invalid match clause(s) list. Valid format is a comma \
                     separated list of field name and value pairs. \
                     ex. field1:value1,field2:value2,..."
                )));
            }
        }
    }
    Ok(pairs)
}

/// Split a comma separated list, dropping empty items.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a raw query clause.
///
/// Without a name the document must be the clause itself. With a
/// name the document is an object of named clauses and the named one
/// is selected.
pub fn parse_raw_clause(input: &str, name: Option<&str>) -> Result<JsonValue, CheckError> {
    let document: JsonValue = serde_json::from_str(input)
        .map_err(|err| CheckError::InvalidClause(format!("failed to parse clause: {err}")))?;
    let clause = match name {
        Some(name) => document
            .get(name)
            .cloned()
            .ok_or_else(|| CheckError::InvalidClause(format!("no clause named \"{name}\"")))?,
        None => document,
    };
    match &clause {
        JsonValue::Object(map) if !map.is_empty() => Ok(clause),
        _ => Err(CheckError::InvalidClause(format!(
            "clause must be a non-empty JSON object: {clause}"
        ))),
    }
}

pub fn load_raw_clause<P: AsRef<Path>>(
    path: P,
    name: Option<&str>,
) -> Result<JsonValue, CheckError> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|err| {
        CheckError::InvalidClause(format!("failed to read {}: {}", path.display(), err))
    })?;
    parse_raw_clause(&input, name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_match_list() {
        let pairs = parse_match_list("kubernetes.namespace_name:openstack,level:ERROR").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs["kubernetes.namespace_name"], "openstack");
        assert_eq!(pairs["level"], "ERROR");

        // Order is kept.
        let keys: Vec<&String> = pairs.keys().collect();
        assert_eq!(keys, vec!["kubernetes.namespace_name", "level"]);
    }

    #[test]
    fn test_parse_match_list_empty() {
        assert!(parse_match_list("").unwrap().is_empty());
        assert!(parse_match_list("  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_match_list_invalid() {
        assert!(parse_match_list("field").is_err());
        assert!(parse_match_list("a:b:c").is_err());
        assert!(parse_match_list("a:b,").is_err());
        assert!(parse_match_list(":value").is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("log, message,,"), vec!["log", "message"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_parse_raw_clause() {
        let clause = parse_raw_clause(r#"{"term": {"level": "ERROR"}}"#, None).unwrap();
        assert_eq!(clause, json!({"term": {"level": "ERROR"}}));

        let named =
            r#"{"errors": {"term": {"level": "ERROR"}}, "other": {"exists": {"field": "x"}}}"#;
        let clause = parse_raw_clause(named, Some("other")).unwrap();
        assert_eq!(clause, json!({"exists": {"field": "x"}}));
    }

    #[test]
    fn test_parse_raw_clause_invalid() {
        assert!(matches!(
            parse_raw_clause("{not json", None),
            Err(CheckError::InvalidClause(_))
        ));
        assert!(matches!(
            parse_raw_clause("[1, 2]", None),
            Err(CheckError::InvalidClause(_))
        ));
        assert!(matches!(
            parse_raw_clause("{}", None),
            Err(CheckError::InvalidClause(_))
        ));
        assert!(matches!(
            parse_raw_clause(r#"{"a": {"term": {}}}"#, Some("b")),
            Err(CheckError::InvalidClause(_))
        ));
    }

    #[test]
    fn test_load_raw_clause_missing_file() {
        assert!(matches!(
            load_raw_clause("/nonexistent/escheck/clause.json", None),
            Err(CheckError::InvalidClause(_))
        ));
    }
}
