// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use super::args::{self, CheckArgs, ConnectionArgs};
use super::prelude::*;
use crate::check::{Evaluator, Verdict};
use crate::error::CheckError;
use crate::query::filter::{self, FilterSpec};
use crate::query::{QueryBuilder, QueryConfig, SearchRequest};

const DEFAULT_RANGE: u32 = 60;

/// Count the events matching a compound query clause read from a file.
#[derive(Debug, Clone, Parser)]
pub struct Args {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[clap(flatten)]
    pub check: CheckArgs,

    /// File containing a JSON query clause
    #[clap(long, required = true, value_name = "FILE")]
    pub query_file: String,

    /// Name of the clause to use if the file holds several
    #[clap(long, value_name = "NAME")]
    pub query_clause: Option<String>,
}

impl Args {
    fn request(&self, index_type: Option<&str>) -> Result<SearchRequest, CheckError> {
        let mut config = QueryConfig::default();
        if let Some(size) = self.check.size {
            config.size = size;
        }
        let filters = FilterSpec {
            raw_clause: Some(filter::load_raw_clause(
                &self.query_file,
                self.query_clause.as_deref(),
            )?),
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
