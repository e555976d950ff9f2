use std::sync::Arc;

use opentelemetry::KeyValue;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::FlexError;
use crate::telemetry::metrics::FLEX_QUERY_ERRORS;

use super::{
    DEFAULT_BASE_URL, DEFAULT_VERSION, FlexToken, HttpTransport, PollSettings, Statement,
    Transport, poller, requestor,
};

pub struct FlexClient {
    transport: Arc<dyn Transport>,
    token: FlexToken,
    base_url: String,
    version: String,
    poll: PollSettings,
    cancel: CancellationToken,
}

impl FlexClient {
    pub fn new(transport: Arc<dyn Transport>, token: FlexToken) -> Self {
        Self {
            transport,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_VERSION.to_string(),
            poll: PollSettings::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Client over HTTP with the base URL, version and polling budget from
    /// `config`.
    pub fn from_config(
        config: &Config,
        token: FlexToken,
        cancel: CancellationToken,
    ) -> Result<Self, FlexError> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Ok(Self::new(Arc::new(transport), token)
            .with_base_url(&config.flex_base_url)
            .with_version(&config.flex_version)
            .with_poll_settings(config.poll)
            .with_cancellation(cancel))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Submits `query_id` and waits for its statement.
    ///
    /// The poll stage only runs if the submit stage produced a reference code;
    /// the first error from either stage is returned as is.
    #[tracing::instrument(
        name = "flex execute_query",
        skip(self),
        fields(
            flex.query_id = %query_id,
            flex.version = %self.version,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        )
    )]
    pub async fn execute_query(&self, query_id: &str) -> Result<Statement, FlexError> {
        let result = self.run(query_id).await;

        if let Err(err) = &result {
            let span = tracing::Span::current();
            span.record("otel.status_code", "ERROR");
            span.record("error.type", err.kind());

            FLEX_QUERY_ERRORS.add(1, &[KeyValue::new("error.type", err.kind())]);
        }

        result
    }

    async fn run(&self, query_id: &str) -> Result<Statement, FlexError> {
        if self.cancel.is_cancelled() {
            return Err(FlexError::Cancelled);
        }

        let reference = requestor::submit(
            self.transport.as_ref(),
            &self.base_url,
            &self.token,
            query_id,
            &self.version,
        )
        .await?;

        poller::poll(
            self.transport.as_ref(),
            &self.base_url,
            &self.token,
            reference,
            &self.version,
            &self.poll,
            &self.cancel,
        )
        .await
    }
}
