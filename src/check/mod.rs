// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Classification of a search outcome into a monitoring verdict.

pub mod evaluator;
pub mod formatter;
pub mod response;
pub mod status;

pub use evaluator::{Comparison, Evaluator, HitCountSource};
pub use formatter::{ActorFormatter, FieldFormatter, HitFormatter};
pub use response::{HttpReply, SearchOutcome, SearchResponse};
pub use status::{Status, Verdict};
