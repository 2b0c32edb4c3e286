// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use super::args::{self, CheckArgs, ConnectionArgs};
use super::prelude::*;
use crate::check::{Evaluator, Verdict};
use crate::error::CheckError;
use crate::query::filter::{FilterSpec, MatchPairs, SimpleQuery};
use crate::query::{QueryBuilder, QueryConfig, SearchRequest};

const DEFAULT_RANGE: u32 = 60;

/// Count the events matching a simple query pattern and optional field
/// matches.
#[derive(Debug, Clone, Parser)]
pub struct Args {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[clap(flatten)]
    pub check: CheckArgs,

    /// Fields to perform the simple query against, comma separated
    #[clap(long, required = true)]
    pub fields: String,

    /// Simple query string
    #[clap(long, required = true)]
    pub query: String,

    /// Match clauses, ex. field1:value1,field2:value2
    #[clap(long = "match", value_parser = args::parse_match, value_name = "MATCHES")]
    pub matches: Option<MatchPairs>,
}

impl Args {
    fn request(&self, index_type: Option<&str>) -> Result<SearchRequest, CheckError> {
        let mut config = QueryConfig::default();
        if let Some(size) = self.check.size {
            config.size = size;
        }
        let filters = FilterSpec {
            simple_query: Some(SimpleQuery::new(&self.query, &self.fields)),
            matches: self.matches.clone().unwrap_or_default(),
            ..Default::default()
        };
        QueryBuilder::new(&self.check.index, self.check.range.unwrap_or(DEFAULT_RANGE))
            .config(config)
            .index_type(index_type)
            .reference_time(self.check.reference_time(None)?)
            .filters(filters)
            .build()
    }
}

pub async fn main(args: Args) -> Verdict {
    args::or_unknown(check(args).await)
}

async fn check(args: Args) -> Result<Verdict, CheckError> {
    let config = args.connection.load_config()?;
    let request = args.request(args.check.index_type(&config).as_deref())?;
    let evaluator = Evaluator::new(args.check.critical_threshold, request.window().minutes())?
        .messages(&args.check.ok_msg, &args.check.critical_msg)
        .count_in_ok(true);
    super::run_check(&args.connection, &config, &request, &evaluator).await
}
