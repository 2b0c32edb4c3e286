// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use super::args::{self, CheckArgs, ConnectionArgs};
use super::prelude::*;
use crate::check::{Evaluator, Verdict};
use crate::error::CheckError;
use crate::query::filter::{self, FilterSpec, MatchPairs, SimpleQuery};
use crate::query::{QueryBuilder, QueryConfig, SearchRequest};

const DEFAULT_RANGE: u32 = 5;

/// Count the events matching any combination of a simple query, field
/// matches and a query clause.
#[derive(Debug, Clone, Parser)]
pub struct Args {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[clap(flatten)]
    pub check: CheckArgs,

    /// File containing a JSON query clause
    #[clap(long, value_name = "FILE")]
    pub query_file: Option<String>,

    /// Name of the clause to use from the query file
    #[clap(long, value_name = "NAME", requires = "query_file")]
    pub query_clause: Option<String>,

    /// Simple query string
    #[clap(long, requires = "simple_query_fields")]
    pub simple_query: Option<String>,

    /// Fields to perform the simple query against, comma separated
    #[clap(long, value_name = "FIELDS", requires = "simple_query")]
    pub simple_query_fields: Option<String>,

    /// Match clauses, ex. field1:value1,field2:value2
    #[clap(long = "match", value_parser = args::parse_match, value_name = "MATCHES")]
    pub matches: Option<MatchPairs>,
}

impl Args {
    fn filters(&self) -> Result<FilterSpec, CheckError> {
        let raw_clause = match &self.query_file {
            Some(path) => Some(filter::load_raw_clause(path, self.query_clause.as_deref())?),
            None => None,
        };
        let simple_query = match (&self.simple_query, &self.simple_query_fields) {
            (Some(query), Some(fields)) => Some(SimpleQuery::new(query, fields)),
            _ => None,
        };
        Ok(FilterSpec {
            raw_clause,
            simple_query,
            matches: self.matches.clone().unwrap_or_default(),
            ..Default::default()
        })
    }

    fn request(&self, index_type: Option<&str>) -> Result<SearchRequest, CheckError> {
        let mut config = QueryConfig::default();
        if let Some(size) = self.check.size {
            config.size = size;
        }
        QueryBuilder::new(&self.check.index, self.check.range.unwrap_or(DEFAULT_RANGE))
            .config(config)
            .index_type(index_type)
            .reference_time(self.check.reference_time(None)?)
            .filters(self.filters()?)
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
        .messages(&args.check.ok_msg, &args.check.critical_msg);
    super::run_check(&args.connection, &config, &request, &evaluator).await
}
