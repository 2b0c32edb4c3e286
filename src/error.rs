// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    /// Bad caller input, such as a window length out of range or a
    /// malformed match list. Raised before any request is sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A raw query clause that could not be loaded or parsed.
    #[error("invalid query clause: {0}")]
    InvalidClause(String),

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(String),

    /// A response was received but does not look like a search result.
    #[error("unexpected response: {0}")]
    MalformedResponse(String),

    #[error("io: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serde: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error),

    #[error("time parser error: {0}")]
    DateTimeParse(#[from] crate::datetime::ParseError),
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
