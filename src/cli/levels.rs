// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use super::args::{self, CheckArgs, ConnectionArgs};
use super::prelude::*;
use crate::check::{Comparison, Evaluator, FieldFormatter, HitCountSource, Verdict};
use crate::error::CheckError;
use crate::query::filter::{self, FilterSpec, MatchKind, MatchPairs, SeverityFilter};
use crate::query::{
    Aggregation, QueryBuilder, QueryConfig, RequestMode, SearchRequest, TimestampEncoding,
};

const DEFAULT_RANGE: u32 = 10;
const DEFAULT_SIZE: u64 = 5;
const AGGREGATION_NAME: &str = "levels";
const AGGREGATION_SIZE: u64 = 5;

/// Alert when a logger emits more than the threshold of events at any
/// one of the alert levels.
#[derive(Debug, Clone, Parser)]
pub struct Args {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[clap(flatten)]
    pub check: CheckArgs,

    /// Name of the logger (application) to check
    #[clap(long, required = true)]
    pub logger: String,

    /// Field holding the logger name
    #[clap(long, default_value = "kubernetes.labels.application")]
    pub logger_field: String,

    /// Severity levels to alert on, comma separated
    #[clap(long, default_value = "ERROR,CRITICAL")]
    pub alert_levels: String,

    /// Field holding the severity level
    #[clap(long, default_value = "severity_label")]
    pub level_field: String,

    /// Field of each sample event to include in the message
    #[clap(long, default_value = "Payload")]
    pub sample_field: String,
}

impl Args {
    fn request(&self, index_type: Option<&str>) -> Result<SearchRequest, CheckError> {
        let labels = filter::split_list(&self.alert_levels);
        let config = QueryConfig {
            encoding: TimestampEncoding::EpochMillis,
            mode: RequestMode::Direct,
            size: self.check.size.unwrap_or(DEFAULT_SIZE),
            aggregation: Some(Aggregation {
                name: AGGREGATION_NAME.to_string(),
                field: self.level_field.clone(),
                size: AGGREGATION_SIZE,
            }),
            ..Default::default()
        };
        let mut matches = MatchPairs::new();
        matches.insert(self.logger_field.clone(), self.logger.clone());
        let filters = FilterSpec {
            matches,
            match_kind: MatchKind::Term,
            severity: Some(SeverityFilter {
                field: self.level_field.clone(),
                labels,
            }),
            ..Default::default()
        };
        QueryBuilder::new(&self.check.index, self.check.range.unwrap_or(DEFAULT_RANGE))
            .config(config)
            .index_type(index_type)
            .reference_time(self.check.reference_time(None)?)
            .filters(filters)
            .build()
    }

    fn evaluator(&self, minutes: u32) -> Result<Evaluator, CheckError> {
        Ok(Evaluator::new(self.check.critical_threshold, minutes)?
            .messages(&self.check.ok_msg, &self.check.critical_msg)
            .comparison(Comparison::Above)
            .source(HitCountSource::BucketMax {
                aggregation: AGGREGATION_NAME.to_string(),
            })
            .formatter(Box::new(FieldFormatter::new(&self.sample_field))))
    }
}

pub async fn main(args: Args) -> Verdict {
    args::or_unknown(check(args).await)
}

async fn check(args: Args) -> Result<Verdict, CheckError> {
    let config = args.connection.load_config()?;
    let request = args.request(args.check.index_type(&config).as_deref())?;
    let evaluator = args.evaluator(request.window().minutes())?;
    super::run_check(&args.connection, &config, &request, &evaluator).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::check::{HttpReply, SearchOutcome, Status};

    fn args() -> Args {
        Args::try_parse_from([
            "levels",
            "logstash",
            "no errors",
            "errors found",
            "2",
            "--logger",
            "nova",
            "--search-timestamp",
            "2024-05-17T12:00:00Z",
        ])
        .unwrap()
    }

    #[test]
    fn test_request() {
        let request = args().request(None).unwrap();
        assert_eq!(request.mode(), RequestMode::Direct);
        assert_eq!(request.path(), "logstash-2024.05.17/_search");

        let rendered = request.rendered();
        let filters = &rendered["query"]["bool"]["filter"];
        assert_eq!(
            filters[0]["range"]["@timestamp"]["format"],
            json!("epoch_millis")
        );
        assert_eq!(
            filters[1],
            json!({"terms": {"kubernetes.labels.application": ["nova"]}})
        );
        assert_eq!(
            filters[2],
            json!({"terms": {"severity_label": ["ERROR", "CRITICAL"]}})
        );
        assert_eq!(rendered["size"], json!(DEFAULT_SIZE));
        assert_eq!(
            rendered["aggs"]["levels"]["terms"]["field"],
            json!("severity_label")
        );
    }

    #[test]
    fn test_evaluate_buckets() {
        let args = args();
        let evaluator = args.evaluator(10).unwrap();
        let body = json!({
            "hits": {"total": {"value": 3}, "hits": [
                {"_source": {"Payload": "disk full"}},
            ]},
            "aggregations": {"levels": {"buckets": [
                {"key": "ERROR", "doc_count": 3},
            ]}},
        });
        let verdict = evaluator.evaluate(&SearchOutcome::Reply(HttpReply::new(
            200,
            body.to_string(),
        )));
        assert_eq!(verdict.status, Status::Critical);
        assert!(verdict.message.contains("3 ERROR"));
        assert!(verdict.message.contains("disk full"));

        // Equal to the threshold is not above it.
        let body = json!({
            "hits": {"total": 2, "hits": []},
            "aggregations": {"levels": {"buckets": [
                {"key": "ERROR", "doc_count": 2},
            ]}},
        });
        let verdict = evaluator.evaluate(&SearchOutcome::Reply(HttpReply::new(
            200,
            body.to_string(),
        )));
        assert_eq!(verdict.status, Status::Ok);
    }
}
