// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::time::Duration;

use tracing::debug;

use crate::check::{HttpReply, SearchOutcome};
use crate::query::SearchRequest;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    disable_certificate_validation: bool,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl Client {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn get_http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if self.disable_certificate_validation {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder.build()
    }

    pub fn post(&self, path: &str) -> Result<reqwest::RequestBuilder, reqwest::Error> {
        let url = format!("{}/{}", self.url, path);
        let request = self
            .get_http_client()?
            .post(&url)
            .header("Content-Type", "application/json");
        let request = if let Some(username) = &self.username {
            request.basic_auth(username, self.password.clone())
        } else {
            request
        };
        Ok(request)
    }

    /// Send the search request, once. Never fails, any error is
    /// returned as part of the outcome.
    pub async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let path = request.path();
        let body = request.body();
        debug!("Query url: {}/{}", self.url, path);
        debug!("Query data: {}", body);

        let response = match self.post(&path) {
            Ok(builder) => builder.json(&body).send().await,
            Err(err) => Err(err),
        };
        let response = match response {
            Ok(response) => response,
            Err(err) => return self.transport_failure(err),
        };
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => {
                debug!("Response: status={}, body={}", status, body);
                SearchOutcome::Reply(HttpReply::new(status, body))
            }
            Err(err) => self.transport_failure(err),
        }
    }

    fn transport_failure(&self, err: reqwest::Error) -> SearchOutcome {
        let reason = if err.is_timeout() {
            format!(
                "timed out after {} waiting for elasticsearch at {}",
                humantime::format_duration(self.timeout),
                self.url
            )
        } else {
            format!("unable to reach elasticsearch at {}: {}", self.url, err)
        };
        SearchOutcome::TransportFailure(reason)
    }
}

#[derive(Debug)]
pub struct ClientBuilder {
    url: String,
    disable_certificate_validation: bool,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    pub fn new(url: &str) -> ClientBuilder {
        ClientBuilder {
            url: url.trim_end_matches('/').to_string(),
            disable_certificate_validation: false,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn disable_certificate_validation(mut self, yes: bool) -> Self {
        self.disable_certificate_validation = yes;
        self
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Client {
        Client {
            url: self.url,
            disable_certificate_validation: self.disable_certificate_validation,
            username: self.username,
            password: self.password,
            timeout: self.timeout,
        }
    }
}
