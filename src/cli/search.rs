// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use anyhow::bail;

use super::args::{self, ConnectionArgs};
use super::prelude::*;
use crate::check::SearchOutcome;
use crate::config::Config;
use crate::datetime;
use crate::query::filter::{FilterSpec, MatchPairs, SimpleQuery};
use crate::query::{QueryBuilder, QueryConfig, SearchRequest};
use crate::types::JsonValue;

const DEFAULT_RANGE: u32 = 60;

/// Run a search and print the raw response, for testing queries.
#[derive(Debug, Clone, Parser)]
pub struct Args {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    /// Index name, the date is appended as -YYYY.MM.DD
    pub index: String,

    /// Fields to perform the simple query against, comma separated
    #[clap(long, required = true)]
    pub fields: String,

    /// Simple query string
    #[clap(long, required = true)]
    pub query: String,

    /// Match clauses, ex. field1:value1,field2:value2
    #[clap(long = "match", value_parser = args::parse_match, value_name = "MATCHES")]
    pub matches: Option<MatchPairs>,

    /// Relative time range between now and x minutes ago
    #[clap(long, value_parser = args::parse_range, default_value_t = DEFAULT_RANGE)]
    pub range: u32,

    /// Number of hits to return
    #[clap(long)]
    pub size: Option<u64>,

    /// Elasticsearch index type, not used by Elasticsearch 7 and newer
    #[clap(long, value_name = "TYPE")]
    pub index_type: Option<String>,

    /// End the search window at this time instead of now
    #[clap(long, value_name = "TIMESTAMP")]
    pub search_timestamp: Option<String>,

    /// Print the request instead of sending it
    #[clap(long)]
    pub dry_run: bool,
}

impl Args {
    fn request(&self, config: &Config) -> Result<SearchRequest> {
        let mut query_config = QueryConfig::default();
        if let Some(size) = self.size {
            query_config.size = size;
        }
        let filters = FilterSpec {
            simple_query: Some(SimpleQuery::new(&self.query, &self.fields)),
            matches: self.matches.clone().unwrap_or_default(),
            ..Default::default()
        };
        let reference = match &self.search_timestamp {
            Some(ts) => Some(datetime::parse(ts, None)?),
            None => None,
        };
        let index_type = self
            .index_type
            .clone()
            .or_else(|| config.get_string("elasticsearch.index-type"));
        let request = QueryBuilder::new(&self.index, self.range)
            .config(query_config)
            .index_type(index_type.as_deref())
            .reference_time(reference)
            .filters(filters)
            .build()?;
        Ok(request)
    }
}

pub async fn main(args: Args) -> Result<()> {
    let config = args.connection.load_config()?;
    let request = args.request(&config)?;
    if args.dry_run {
        println!("POST {}", request.path());
        println!("{}", serde_json::to_string_pretty(&request.body())?);
        return Ok(());
    }

    let client = args.connection.client(&config)?;
    info!("Searching {} at {}", request.indices(), client.url());
    match client.search(&request).await {
        SearchOutcome::TransportFailure(reason) => bail!(reason),
        SearchOutcome::Reply(reply) => {
            debug!("Response status: {}", reply.status);
            match serde_json::from_str::<JsonValue>(&reply.body) {
                Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                Err(_) => println!("{}", reply.body),
            }
            if !reply.is_success() {
                bail!("elasticsearch returned status {}", reply.status);
            }
        }
    }
    Ok(())
}
