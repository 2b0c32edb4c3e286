// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Rendering of sample hits for the critical message.

use regex::Regex;

use crate::types::JsonValue;

lazy_static! {
    static ref FROM_TO_USER: Regex =
        Regex::new(r"(?i): from user: ([^\s:]+): to user: ([^\s:]+)").unwrap();
}

pub const DEFAULT_USER_ID_PATTERN: &str = r"^\w{2}\d{4}";

pub trait HitFormatter: Send + Sync {
    /// Summarize one hit, or `None` to leave it out of the message.
    fn format(&self, hit: &JsonValue) -> Option<String>;
}

/// Look up a field of the hit's `_source`. The name is first tried
/// as is, then as a dotted path into nested objects.
pub fn source_field<'a>(hit: &'a JsonValue, field: &str) -> Option<&'a JsonValue> {
    let source = &hit["_source"];
    if let Some(value) = source.get(field) {
        return Some(value);
    }
    let mut value = source;
    for part in field.split('.') {
        value = value.get(part)?;
    }
    Some(value)
}

fn as_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a single field, such as a log payload or a pod name.
#[derive(Debug, Clone)]
pub struct FieldFormatter {
    field: String,
}

impl FieldFormatter {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

impl HitFormatter for FieldFormatter {
    fn format(&self, hit: &JsonValue) -> Option<String> {
        source_field(hit, &self.field).map(as_text)
    }
}

/// Pulls the two accounts out of a "from user: X: to user: Y" log
/// line and renders `( timestamp ; X ; Y ; line )`.
#[derive(Debug, Clone)]
pub struct ActorFormatter {
    log_field: String,
    timestamp_field: String,
    excluded: Vec<String>,
    unrecognized_only: Option<Regex>,
}

impl Default for ActorFormatter {
    fn default() -> Self {
        Self {
            log_field: "log".to_string(),
            timestamp_field: "@timestamp".to_string(),
            excluded: vec!["root".to_string()],
            unrecognized_only: None,
        }
    }
}

impl ActorFormatter {
    pub fn new(log_field: &str, timestamp_field: &str) -> Self {
        Self {
            log_field: log_field.to_string(),
            timestamp_field: timestamp_field.to_string(),
            ..Default::default()
        }
    }

    /// Actors blanked out of the summary, compared case insensitive.
    pub fn excluded(mut self, excluded: Vec<String>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Only keep hits where either actor does not look like a
    /// regular user id.
    pub fn unrecognized_only(mut self, user_id: Regex) -> Self {
        self.unrecognized_only = Some(user_id);
        self
    }

    fn actor(&self, name: &str) -> String {
        if self.excluded.iter().any(|e| e.eq_ignore_ascii_case(name)) {
            String::new()
        } else {
            name.to_string()
        }
    }

    /// The (from, to) actors of a log line, blank if not present.
    pub fn actors(&self, line: &str) -> (String, String) {
        match FROM_TO_USER.captures(line) {
            Some(c) => (self.actor(&c[1]), self.actor(&c[2])),
            None => (String::new(), String::new()),
        }
    }
}

impl HitFormatter for ActorFormatter {
    fn format(&self, hit: &JsonValue) -> Option<String> {
        let line = source_field(hit, &self.log_field).map(as_text).unwrap_or_default();
        let timestamp = source_field(hit, &self.timestamp_field)
            .map(as_text)
            .unwrap_or_default();
        let (from, to) = self.actors(&line);
        if let Some(user_id) = &self.unrecognized_only {
            if user_id.is_match(&from) && user_id.is_match(&to) {
                return None;
            }
        }
        Some(format!("( {timestamp} ; {from} ; {to} ; {line} )"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn hit(source: JsonValue) -> JsonValue {
        json!({"_index": "log-2024.05.17", "_source": source})
    }

    #[test]
    fn test_field_formatter() {
        let f = FieldFormatter::new("Payload");
        assert_eq!(
            f.format(&hit(json!({"Payload": "disk full"}))),
            Some("disk full".to_string())
        );
        assert_eq!(f.format(&hit(json!({"other": 1}))), None);
    }

    #[test]
    fn test_field_formatter_dotted() {
        let nested = FieldFormatter::new("kubernetes.pod_name");
        assert_eq!(
            nested.format(&hit(json!({"kubernetes": {"pod_name": "nova-api-0"}}))),
            Some("nova-api-0".to_string())
        );
        // A literal dotted key wins.
        assert_eq!(
            nested.format(&hit(json!({"kubernetes.pod_name": "flat"}))),
            Some("flat".to_string())
        );
        let number = FieldFormatter::new("code");
        assert_eq!(number.format(&hit(json!({"code": 503}))), Some("503".to_string()));
    }

    #[test]
    fn test_actor_formatter() {
        let f = ActorFormatter::default();
        let line = "sshd[1]: nologin: allowed: from user: ab1234: to user: root: tty1";
        let out = f
            .format(&hit(json!({"@timestamp": "2024-05-17T12:00:00Z", "log": line})))
            .unwrap();
        assert_eq!(out, format!("( 2024-05-17T12:00:00Z ; ab1234 ;  ; {line} )"));
    }

    #[test]
    fn test_actor_excluded_case_insensitive() {
        let f = ActorFormatter::default();
        assert_eq!(
            f.actors("x: from user: ROOT: to user: zz9999"),
            (String::new(), "zz9999".to_string())
        );
        assert_eq!(f.actors("no actors here"), (String::new(), String::new()));
    }

    #[test]
    fn test_actor_unrecognized_only() {
        let f = ActorFormatter::default()
            .unrecognized_only(Regex::new(DEFAULT_USER_ID_PATTERN).unwrap());

        // Both are regular user ids, filtered.
        let known = hit(json!({"log": "x: from user: ab1234: to user: cd5678: y"}));
        assert_eq!(f.format(&known), None);

        // A service account is reported.
        let service = hit(json!({"log": "x: from user: ab1234: to user: oracle: y"}));
        assert!(f.format(&service).is_some());

        // Root is blanked and therefore never a regular user id.
        let root = hit(json!({"log": "x: from user: root: to user: ab1234: y"}));
        assert!(f.format(&root).is_some());
    }
}
