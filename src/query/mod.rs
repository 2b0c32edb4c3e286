// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Construction of the time bounded search request.

pub mod builder;
pub mod filter;
pub mod index;
pub mod window;

pub use builder::{
    Aggregation, QueryBuilder, QueryConfig, RequestMode, SearchRequest, TimestampEncoding,
};
pub use filter::{FilterSpec, MatchKind, MatchPairs, SeverityFilter, SimpleQuery};
pub use index::IndexSelector;
pub use window::TimeWindow;
