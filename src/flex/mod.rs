//! Client for the IBKR Flex Web Service.
//!
//! Statements are produced asynchronously on the server. A query is first
//! submitted with [`requestor::submit`], which yields a [`ReferenceCode`];
//! the statement is then fetched with [`poller::poll`] until the server stops
//! answering "generation in progress". [`FlexClient::execute_query`] runs both
//! stages in sequence.

pub mod client;
pub mod poller;
pub mod requestor;
pub mod transport;
mod xml;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::time::Duration;

pub use client::FlexClient;
pub use transport::{HttpTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "https://gdcdyn.interactivebrokers.com/Universal/servlet";
pub const DEFAULT_VERSION: &str = "3";

/// Body text the service returns while a statement is still being generated.
pub const IN_PROGRESS_MARKER: &str = "Statement generation in progress";

/// Static Flex Web Service token. Never printed.
#[derive(Clone)]
pub struct FlexToken(String);

impl FlexToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FlexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FlexToken(<redacted>)")
    }
}

/// Handle for one submitted statement request.
///
/// Not `Clone`: a reference code is consumed by the single poll loop that
/// fetches its statement.
#[derive(Debug, PartialEq, Eq)]
pub struct ReferenceCode(String);

impl ReferenceCode {
    pub(crate) fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw XML of a completed Flex statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(String);

impl Statement {
    pub fn new(xml: impl Into<String>) -> Self {
        Self(xml.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Fixed-interval polling budget for [`poller::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            backoff: Duration::from_secs(2),
        }
    }
}

fn endpoint(base_url: &str, service: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), service)
}
