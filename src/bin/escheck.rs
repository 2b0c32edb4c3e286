// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use clap::error::ErrorKind;
use clap::Parser;
use escheck::check::Verdict;
use escheck::cli::Commands;
use escheck::{logger, version};
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "escheck", version = version::VERSION, about)]
struct Cli {
    /// Increase verbosity, may be given multiple times
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log the request and raw response
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
            _ => {
                // A monitoring system must see UNKNOWN, not a usage error.
                let rendered = err.to_string();
                let reason = rendered.lines().next().unwrap_or("invalid arguments");
                let reason = reason.trim_start_matches("error: ");
                Verdict::unknown(reason).exit()
            }
        },
    };

    let level = logger::level_from_verbosity(cli.verbose, cli.debug);
    logger::init_logger(level);
    logger::init_stdlog(level);
    version::log_version();

    match cli.command {
        Commands::Version => version::print_version(),
        Commands::Search(args) => {
            if let Err(err) = escheck::cli::search::main(args).await {
                error!("{:#}", err);
                std::process::exit(1);
            }
        }
        Commands::Query(args) => escheck::cli::query::main(args).await.exit(),
        Commands::Pattern(args) => escheck::cli::pattern::main(args).await.exit(),
        Commands::Compound(args) => escheck::cli::compound::main(args).await.exit(),
        Commands::Levels(args) => escheck::cli::levels::main(args).await.exit(),
        Commands::FailedLogins(args) => escheck::cli::failed_logins::main(args).await.exit(),
    }
}
