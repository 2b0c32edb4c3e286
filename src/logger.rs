// SPDX-License-Identifier: MIT
//
// Copyright (C) 2020-2022 Jason Ish

use time::macros::format_description;
use time::UtcOffset;
use tracing::{debug, Level};
use tracing_subscriber::fmt::time::OffsetTime;

/// Map the number of -v flags to a log level.
///
/// A check is expected to be quiet, only the status line goes to
/// stdout, so the default is warnings only.
pub fn level_from_verbosity(verbosity: u8, debug: bool) -> Level {
    match verbosity {
        0 if debug => Level::DEBUG,
        0 => Level::WARN,
        1 if debug => Level::DEBUG,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn init_logger(level: Level) {
    let level = match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    };

    // Must be read before any threads are started, otherwise time
    // refuses to give us the local offset.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    );

    let builder = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(format!("{level},hyper=off,rustls=off"))
        .with_writer(std::io::stderr)
        .with_timer(timer);

    #[cfg(target_os = "windows")]
    let builder = builder.with_ansi(false);

    if let Err(err) = tracing::subscriber::set_global_default(builder.finish()) {
        eprintln!("Failed to set default log subscriber: {err}");
    }
}

/// Forward records from crates logging through `log`, such as reqwest.
pub fn init_stdlog(level: Level) {
    let filter = match level {
        Level::TRACE => log::LevelFilter::Trace,
        Level::DEBUG => log::LevelFilter::Debug,
        Level::INFO => log::LevelFilter::Info,
        Level::WARN => log::LevelFilter::Warn,
        Level::ERROR => log::LevelFilter::Error,
    };
    if let Err(err) = tracing_log::LogTracer::builder()
        .with_max_level(filter)
        .init()
    {
        debug!("Failed to forward log records to tracing: {}", err);
    }
}
