// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use tracing::debug;

use super::formatter::HitFormatter;
use super::response::{SearchOutcome, SearchResponse};
use super::status::Verdict;
use crate::error::CheckError;

pub const NO_DATA_MESSAGE: &str = "No data available to evaluate";

/// How a count is compared to the threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Comparison {
    /// Critical if count >= threshold.
    #[default]
    AtLeast,
    /// Critical if count > threshold.
    Above,
}

impl Comparison {
    pub fn exceeds(&self, count: u64, threshold: u64) -> bool {
        match self {
            Comparison::AtLeast => count >= threshold,
            Comparison::Above => count > threshold,
        }
    }

    fn symbol(&self, exceeded: bool) -> &'static str {
        match (self, exceeded) {
            (Comparison::AtLeast, true) => ">=",
            (Comparison::AtLeast, false) => "<",
            (Comparison::Above, true) => ">",
            (Comparison::Above, false) => "<=",
        }
    }
}

/// Where the count compared against the threshold comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HitCountSource {
    /// `hits.total`.
    #[default]
    Total,
    /// The largest bucket of the named terms aggregation. Any bucket
    /// over the threshold makes the check critical.
    BucketMax { aggregation: String },
}

/// Turns the outcome of a search into a verdict.
pub struct Evaluator {
    threshold: u64,
    minutes: u32,
    ok_message: String,
    critical_message: String,
    comparison: Comparison,
    source: HitCountSource,
    count_in_ok: bool,
    formatter: Option<Box<dyn HitFormatter>>,
}

impl Evaluator {
    pub fn new(threshold: u64, minutes: u32) -> Result<Self, CheckError> {
        if threshold < 1 {
            return Err(CheckError::InvalidInput(format!(
                "{threshold} is an invalid threshold. Valid threshold is > 0"
            )));
        }
        Ok(Self {
            threshold,
            minutes,
            ok_message: String::new(),
            critical_message: String::new(),
            comparison: Comparison::default(),
            source: HitCountSource::default(),
            count_in_ok: false,
            formatter: None,
        })
    }

    pub fn messages(mut self, ok: &str, critical: &str) -> Self {
        self.ok_message = ok.to_string();
        self.critical_message = critical.to_string();
        self
    }

    pub fn comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn source(mut self, source: HitCountSource) -> Self {
        self.source = source;
        self
    }

    /// Prefix the OK message with the count found.
    pub fn count_in_ok(mut self, yes: bool) -> Self {
        self.count_in_ok = yes;
        self
    }

    pub fn formatter(mut self, formatter: Box<dyn HitFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn evaluate(&self, outcome: &SearchOutcome) -> Verdict {
        let reply = match outcome {
            SearchOutcome::TransportFailure(reason) => {
                return Verdict::unknown(format!("Unexpected Error Occurred. {reason}"));
            }
            SearchOutcome::Reply(reply) => reply,
        };

        let response = match SearchResponse::from_reply(reply) {
            Ok(response) => response,
            Err(err) => return unexpected(err),
        };

        match &self.source {
            HitCountSource::Total => match response.total_hits() {
                Ok(count) => self.evaluate_count(count, &response, None),
                Err(err) => unexpected(err),
            },
            HitCountSource::BucketMax { aggregation } => {
                let buckets = match response.buckets(aggregation) {
                    Ok(Some(buckets)) => buckets,
                    Ok(None) => return Verdict::ok(NO_DATA_MESSAGE),
                    Err(err) => return unexpected(err),
                };
                if buckets.is_empty() {
                    return Verdict::ok(format!(
                        "No matching logs found in the last {} minute(s)",
                        self.minutes
                    ));
                }
                let count = buckets.iter().map(|b| b.doc_count).max().unwrap_or(0);
                let counts = buckets
                    .iter()
                    .map(|b| format!("{} {}", b.doc_count, b.key_string()))
                    .collect::<Vec<String>>()
                    .join(", ");
                self.evaluate_count(count, &response, Some(counts))
            }
        }
    }

    fn evaluate_count(
        &self,
        count: u64,
        response: &SearchResponse,
        counts: Option<String>,
    ) -> Verdict {
        let exceeded = self.comparison.exceeds(count, self.threshold);
        debug!(
            "Evaluated count={}, threshold={}, exceeded={}",
            count, self.threshold, exceeded
        );
        let summary = format!(
            "Found {} {} {}(threshold) occurrences within the last {} minute(s).",
            count,
            self.comparison.symbol(exceeded),
            self.threshold,
            self.minutes
        );

        if !exceeded {
            if self.count_in_ok {
                return Verdict::ok(join(&[&summary, &self.ok_message]));
            }
            return Verdict::ok(self.ok_message.clone());
        }

        let mut message = join(&[&summary, &self.critical_message]);
        if let Some(counts) = counts {
            message = format!("{message} counts: {counts}.");
        }
        let samples = self.samples(response);
        if !samples.is_empty() {
            message = format!("{message} results: {samples}");
        }
        Verdict::critical(message)
    }

    fn samples(&self, response: &SearchResponse) -> String {
        match &self.formatter {
            Some(formatter) => response
                .hits()
                .iter()
                .filter_map(|hit| formatter.format(hit))
                .collect::<Vec<String>>()
                .join(" "),
            None => String::new(),
        }
    }
}

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<&str>>()
        .join(" ")
}

fn unexpected(err: CheckError) -> Verdict {
    match err {
        CheckError::MalformedResponse(payload) => {
            Verdict::unknown(format!("Unexpected results found. {payload}"))
        }
        err => Verdict::unknown(format!("Unexpected results found. {err}")),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::check::formatter::FieldFormatter;
    use crate::check::response::HttpReply;
    use crate::check::status::Status;
    use crate::types::JsonValue;

    fn reply(body: JsonValue) -> SearchOutcome {
        SearchOutcome::Reply(HttpReply::new(200, body.to_string()))
    }

    fn total(n: i64) -> SearchOutcome {
        reply(json!({"hits": {"total": n, "hits": []}}))
    }

    #[test]
    fn test_critical_scenario() {
        let evaluator = Evaluator::new(5, 10)
            .unwrap()
            .messages("all quiet", "too many errors");
        let verdict = evaluator.evaluate(&total(7));
        assert_eq!(verdict.status, Status::Critical);
        assert_eq!(verdict.exit_code(), 2);
        assert_eq!(
            verdict.message,
            "Found 7 >= 5(threshold) occurrences within the last 10 minute(s). too many errors"
        );
    }

    #[test]
    fn test_ok_scenario() {
        let evaluator = Evaluator::new(100, 60)
            .unwrap()
            .messages("all quiet", "too many errors");
        let verdict = evaluator.evaluate(&total(3));
        assert_eq!(verdict.status, Status::Ok);
        assert_eq!(verdict.exit_code(), 0);
        assert_eq!(verdict.message, "all quiet");
    }

    #[test]
    fn test_ok_with_count() {
        let evaluator = Evaluator::new(100, 60)
            .unwrap()
            .messages("all quiet", "too many errors")
            .count_in_ok(true);
        let verdict = evaluator.evaluate(&total(3));
        assert_eq!(
            verdict.message,
            "Found 3 < 100(threshold) occurrences within the last 60 minute(s). all quiet"
        );
    }

    #[test]
    fn test_monotonic_in_count() {
        let evaluator = Evaluator::new(5, 10).unwrap();
        for n in 0..20 {
            let expected = if n >= 5 { Status::Critical } else { Status::Ok };
            assert_eq!(evaluator.evaluate(&total(n)).status, expected, "n={n}");
        }

        let strict = Evaluator::new(5, 10).unwrap().comparison(Comparison::Above);
        assert_eq!(strict.evaluate(&total(5)).status, Status::Ok);
        assert_eq!(strict.evaluate(&total(6)).status, Status::Critical);
    }

    #[test]
    fn test_transport_failure() {
        for threshold in [1, 5, 1000] {
            let evaluator = Evaluator::new(threshold, 10).unwrap();
            let verdict = evaluator.evaluate(&SearchOutcome::TransportFailure(
                "unable to reach elasticsearch at http://localhost:9200: connection refused"
                    .to_string(),
            ));
            assert_eq!(verdict.status, Status::Unknown);
            assert_eq!(verdict.exit_code(), 3);
            assert!(verdict.message.contains("unable to reach elasticsearch"));
        }
    }

    #[test]
    fn test_missing_total() {
        let evaluator = Evaluator::new(5, 10).unwrap();
        let verdict = evaluator.evaluate(&reply(json!({"hits": {"hits": []}})));
        assert_eq!(verdict.status, Status::Unknown);
        assert_eq!(verdict.exit_code(), 3);
        assert!(verdict.message.starts_with("Unexpected results found."));
    }

    #[test]
    fn test_negative_total() {
        let evaluator = Evaluator::new(5, 10).unwrap();
        assert_eq!(evaluator.evaluate(&total(-1)).status, Status::Unknown);
    }

    #[test]
    fn test_error_status() {
        let evaluator = Evaluator::new(5, 10).unwrap();
        let outcome = SearchOutcome::Reply(HttpReply::new(
            404,
            r#"{"error": {"reason": "no such index"}, "status": 404}"#,
        ));
        let verdict = evaluator.evaluate(&outcome);
        assert_eq!(verdict.status, Status::Unknown);
        assert!(verdict.message.contains("404"));
        assert!(verdict.message.contains("no such index"));
    }

    #[test]
    fn test_samples() {
        let evaluator = Evaluator::new(1, 5)
            .unwrap()
            .messages("ok", "bad")
            .formatter(Box::new(FieldFormatter::new("Payload")));
        let outcome = reply(json!({"hits": {"total": 2, "hits": [
            {"_source": {"Payload": "first"}},
            {"_source": {"Payload": "second"}},
        ]}}));
        let verdict = evaluator.evaluate(&outcome);
        assert_eq!(verdict.status, Status::Critical);
        assert!(verdict.message.ends_with("bad results: first second"));

        // Samples are not part of an OK message.
        let evaluator = Evaluator::new(10, 5)
            .unwrap()
            .messages("ok", "bad")
            .formatter(Box::new(FieldFormatter::new("Payload")));
        assert_eq!(evaluator.evaluate(&outcome).message, "ok");
    }

    fn buckets_evaluator(threshold: u64) -> Evaluator {
        Evaluator::new(threshold, 10)
            .unwrap()
            .messages("no errors", "errors logged")
            .comparison(Comparison::Above)
            .source(HitCountSource::BucketMax {
                aggregation: "levels".to_string(),
            })
    }

    #[test]
    fn test_buckets_missing_is_ok() {
        let verdict = buckets_evaluator(5).evaluate(&reply(json!({"hits": {"total": 0}})));
        assert_eq!(verdict.status, Status::Ok);
        assert_eq!(verdict.message, NO_DATA_MESSAGE);
    }

    #[test]
    fn test_buckets_empty_is_ok() {
        let verdict = buckets_evaluator(5)
            .evaluate(&reply(json!({"aggregations": {"levels": {"buckets": []}}})));
        assert_eq!(verdict.status, Status::Ok);
        assert!(verdict.message.contains("in the last 10 minute(s)"));
    }

    #[test]
    fn test_any_bucket_over_threshold() {
        let outcome = reply(json!({
            "hits": {"total": 9, "hits": [{"_source": {"Payload": "boom"}}]},
            "aggregations": {"levels": {"buckets": [
                {"key": "ERROR", "doc_count": 2},
                {"key": "CRITICAL", "doc_count": 7},
            ]}}
        }));
        let verdict = buckets_evaluator(5)
            .formatter(Box::new(FieldFormatter::new("Payload")))
            .evaluate(&outcome);
        assert_eq!(verdict.status, Status::Critical);
        assert_eq!(
            verdict.message,
            "Found 7 > 5(threshold) occurrences within the last 10 minute(s). errors logged \
             counts: 2 ERROR, 7 CRITICAL. results: boom"
        );

        let verdict = buckets_evaluator(7).evaluate(&outcome);
        assert_eq!(verdict.status, Status::Ok);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(Evaluator::new(0, 10).is_err());
    }
}
