// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

pub mod client;
pub mod request;

pub use client::{Client, ClientBuilder};
