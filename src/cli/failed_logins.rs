// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use regex::Regex;

use super::args::{self, CheckArgs, ConnectionArgs};
use super::prelude::*;
use crate::check::formatter::DEFAULT_USER_ID_PATTERN;
use crate::check::{ActorFormatter, Evaluator, Verdict};
use crate::datetime::{self, DateTime};
use crate::error::CheckError;
use crate::query::builder::DEFAULT_TIME_FIELD;
use crate::query::filter::{self, FilterSpec, MatchKind, MatchPairs};
use crate::query::{QueryBuilder, QueryConfig, SearchRequest};

const DEFAULT_RANGE: u32 = 60;
const DEFAULT_SIZE: u64 = 25;

/// Count failed login attempts logged as "from user: X: to user: Y".
#[derive(Debug, Clone, Parser)]
pub struct Args {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[clap(flatten)]
    pub check: CheckArgs,

    /// Time zone of the search, +hh:mm or -hh:mm
    #[clap(long, default_value = "-04:00", allow_hyphen_values = true)]
    pub search_timezone: String,

    /// Date of the index to search, YYYY-MM-DD, defaults to the end of
    /// the search window
    #[clap(long, value_name = "DATE")]
    pub index_date: Option<String>,

    /// Days relative to the index date to also search
    #[clap(
        long,
        value_delimiter = ',',
        default_value = "0,-1",
        allow_hyphen_values = true
    )]
    pub index_day_offsets: Vec<i64>,

    /// Field holding the log line
    #[clap(long, default_value = "log")]
    pub log_field: String,

    /// Phrase identifying a failed login
    #[clap(long, default_value = "nologin: allowed: from user:")]
    pub phrase: String,

    /// Only report attempts involving an unrecognized user id
    #[clap(long)]
    pub unrecognized_users_only: bool,

    /// Pattern of a recognized user id
    #[clap(long, default_value = DEFAULT_USER_ID_PATTERN)]
    pub user_id_pattern: String,

    /// Users left out of the summary, comma separated
    #[clap(long, default_value = "root")]
    pub excluded_users: String,
}

impl Args {
    fn request(&self, index_type: Option<&str>) -> Result<SearchRequest, CheckError> {
        let tz = self.search_timezone.trim();
        let end = self
            .check
            .reference_time(Some(tz))?
            .unwrap_or_else(DateTime::now);
        let anchor = match &self.index_date {
            Some(date) => datetime::parse_date(date)?,
            None => end.utc_date(),
        };

        let config = QueryConfig {
            time_zone: Some(tz.to_string()),
            size: self.check.size.unwrap_or(DEFAULT_SIZE),
            source_fields: vec![self.log_field.clone(), DEFAULT_TIME_FIELD.to_string()],
            ..Default::default()
        };
        let mut matches = MatchPairs::new();
        matches.insert(self.log_field.clone(), self.phrase.clone());
        let filters = FilterSpec {
            matches,
            match_kind: MatchKind::Phrase,
            ..Default::default()
        };
        QueryBuilder::new(&self.check.index, self.check.range.unwrap_or(DEFAULT_RANGE))
            .config(config)
            .index_type(index_type)
            .reference_time(Some(end))
            .index_days(anchor, self.index_day_offsets.clone())
            .filters(filters)
            .build()
    }

    fn evaluator(&self, minutes: u32) -> Result<Evaluator, CheckError> {
        let mut formatter = ActorFormatter::new(&self.log_field, DEFAULT_TIME_FIELD)
            .excluded(filter::split_list(&self.excluded_users));
        if self.unrecognized_users_only {
            let user_id = Regex::new(&self.user_id_pattern).map_err(|err| {
                CheckError::InvalidInput(format!(
                    "invalid user id pattern {}: {err}",
                    self.user_id_pattern
                ))
            })?;
            formatter = formatter.unrecognized_only(user_id);
        }
        Ok(Evaluator::new(self.check.critical_threshold, minutes)?
            .messages(&self.check.ok_msg, &self.check.critical_msg)
            .formatter(Box::new(formatter)))
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
