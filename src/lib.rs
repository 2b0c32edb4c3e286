// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Nagios style checks that count log events stored in Elasticsearch
//! over a recent window of time and turn the count into a status.

// Clippy suppressions. These are the global ones I don't care about.
#![allow(clippy::needless_return)]
#![allow(clippy::redundant_field_names)]

pub mod check;
pub mod cli;
pub mod config;
pub mod datetime;
pub mod elastic;
pub mod error;
pub mod logger;
pub mod prelude;
pub mod query;
pub mod types;
pub mod version;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_json;
