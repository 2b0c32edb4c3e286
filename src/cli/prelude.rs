// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

#![allow(unused_imports)]

pub(crate) use anyhow::Result;
pub(crate) use clap::{Parser, Subcommand};
pub(crate) use tracing::{debug, info};
