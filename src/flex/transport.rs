use std::time::{Duration, Instant};

use opentelemetry::KeyValue;

use crate::error::FlexError;
use crate::telemetry::metrics::FLEX_REQUEST_DURATION;

/// One GET round trip to the Flex Web Service.
///
/// Implementations return the response body as text. Connection failures,
/// timeouts and non-success HTTP statuses are all [`FlexError::Transport`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<String, FlexError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, FlexError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flex-dividends/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<String, FlexError> {
        let start = Instant::now();

        let result: Result<String, reqwest::Error> = async {
            let response = self
                .client
                .get(url)
                .query(params)
                .send()
                .await?
                .error_for_status()?;
            response.text().await
        }
        .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        FLEX_REQUEST_DURATION.record(
            start.elapsed().as_secs_f64(),
            &[
                KeyValue::new("flex.service", service_name(url).to_string()),
                KeyValue::new("flex.outcome", outcome),
            ],
        );

        result.map_err(FlexError::from)
    }
}

fn service_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
