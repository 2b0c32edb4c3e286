// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Arguments shared by the check commands.

use std::time::Duration;

use super::prelude::*;
use crate::check::Verdict;
use crate::config::Config;
use crate::datetime::{self, DateTime};
use crate::elastic::{Client, ClientBuilder};
use crate::error::CheckError;
use crate::query::filter::{self, MatchPairs};
use crate::query::window;

pub const DEFAULT_URL: &str = "http://localhost:9200";

#[derive(Clone, Debug, Parser, Default)]
pub struct ConnectionArgs {
    /// Elasticsearch URL
    #[clap(
        short,
        long,
        visible_alias = "elasticsearch",
        env = "ESCHECK_ELASTICSEARCH_URL",
        hide_env = true,
        value_name = "URL"
    )]
    pub endpoint: Option<String>,

    /// Elasticsearch username.
    #[clap(long = "usr", visible_alias = "username", value_name = "USERNAME")]
    pub username: Option<String>,

    /// Elasticsearch password.
    #[clap(long = "pwd", visible_alias = "password", value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Disable TLS certificate validation
    #[clap(short = 'k', long)]
    pub no_check_certificate: bool,

    /// Give up on Elasticsearch after this long, eg. 15s
    #[clap(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub timeout: Option<Duration>,

    /// Configuration filename
    #[clap(short, long, value_name = "FILE")]
    pub config: Option<String>,
}

impl ConnectionArgs {
    pub fn load_config(&self) -> Result<Config, CheckError> {
        match &self.config {
            Some(filename) => Config::from_file(filename),
            None => Ok(Config::empty()),
        }
    }

    /// Build a client from the command line, falling back to the
    /// environment and then the configuration file.
    pub fn client(&self, config: &Config) -> Result<Client, CheckError> {
        let url = self
            .endpoint
            .clone()
            .or_else(|| config.get_string("elasticsearch.url"))
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => match config.get_string("elasticsearch.timeout") {
                Some(timeout) => humantime::parse_duration(&timeout).map_err(|err| {
                    CheckError::InvalidInput(format!("invalid timeout {timeout}: {err}"))
                })?,
                None => crate::elastic::client::DEFAULT_TIMEOUT,
            },
        };
        let no_check_certificate =
            self.no_check_certificate || config.get_bool("elasticsearch.no-check-certificate");

        let mut client = ClientBuilder::new(&url)
            .disable_certificate_validation(no_check_certificate)
            .with_timeout(timeout);
        if let Some(username) = self
            .username
            .clone()
            .or_else(|| config.get_string("elasticsearch.username"))
        {
            client = client.with_username(&username);
        }
        if let Some(password) = self
            .password
            .clone()
            .or_else(|| config.get_string("elasticsearch.password"))
        {
            client = client.with_password(&password);
        }
        Ok(client.build())
    }
}

#[derive(Clone, Debug, Parser)]
pub struct CheckArgs {
    /// Index name, the date is appended as -YYYY.MM.DD
    pub index: String,

    /// OK status display message
    pub ok_msg: String,

    /// Critical status display message
    pub critical_msg: String,

    /// Status is critical if the number of hits reaches the threshold
    #[clap(value_parser = parse_threshold)]
    pub critical_threshold: u64,

    /// Relative time range between now and x minutes ago, 1 <= x <= 1440
    #[clap(long, value_parser = parse_range, value_name = "MINUTES")]
    pub range: Option<u32>,

    /// Elasticsearch index type, not used by Elasticsearch 7 and newer
    #[clap(long, value_name = "TYPE")]
    pub index_type: Option<String>,

    /// Number of sample hits to request
    #[clap(long)]
    pub size: Option<u64>,

    /// End the search window at this time instead of now
    #[clap(long, value_name = "TIMESTAMP")]
    pub search_timestamp: Option<String>,
}

impl CheckArgs {
    pub fn index_type(&self, config: &Config) -> Option<String> {
        self.index_type
            .clone()
            .or_else(|| config.get_string("elasticsearch.index-type"))
    }

    pub fn reference_time(&self, tz_offset: Option<&str>) -> Result<Option<DateTime>, CheckError> {
        match &self.search_timestamp {
            Some(ts) => Ok(Some(datetime::parse(ts, tz_offset)?)),
            None => Ok(None),
        }
    }
}

pub fn parse_range(value: &str) -> Result<u32, String> {
    let minutes = value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("{value} is not a number of minutes"))?;
    window::validate_minutes(minutes).map_err(|err| err.to_string())
}

pub fn parse_threshold(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(threshold) if threshold >= 1 => Ok(threshold),
        _ => Err(format!("{value} is an invalid threshold. Valid threshold is > 0")),
    }
}

pub fn parse_match(value: &str) -> Result<MatchPairs, String> {
    filter::parse_match_list(value).map_err(|err| err.to_string())
}

/// Any error before or while building the request is UNKNOWN.
pub fn or_unknown(result: Result<Verdict, CheckError>) -> Verdict {
    match result {
        Ok(verdict) => verdict,
        Err(err) => Verdict::unknown(err.to_string()),
    }
}
