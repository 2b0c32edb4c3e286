// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

pub mod args;
pub mod compound;
pub mod failed_logins;
pub mod levels;
pub mod pattern;
pub mod query;
pub mod search;

pub(crate) mod prelude;

use clap::Subcommand;

use crate::check::{Evaluator, Verdict};
use crate::config::Config;
use crate::error::CheckError;
use crate::query::SearchRequest;
use args::ConnectionArgs;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count events within the window, optionally narrowed by a query
    /// clause, a simple query or field matches
    Query(query::Args),
    /// Count events matching a simple query pattern
    Pattern(pattern::Args),
    /// Count events matching a compound query clause from a file
    Compound(compound::Args),
    /// Count events of a logger at alert severity levels
    Levels(levels::Args),
    /// Count failed login attempts
    FailedLogins(failed_logins::Args),
    /// Run a search and print the raw response
    Search(search::Args),
    /// Print version and exit
    Version,
}

/// Send the request once and classify the outcome.
pub(crate) async fn run_check(
    connection: &ConnectionArgs,
    config: &Config,
    request: &SearchRequest,
    evaluator: &Evaluator,
) -> Result<Verdict, CheckError> {
    let client = connection.client(config)?;
    let outcome = client.search(request).await;
    Ok(evaluator.evaluate(&outcome))
}
