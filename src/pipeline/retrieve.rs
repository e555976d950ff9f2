use opentelemetry::KeyValue;
use thiserror::Error;

use crate::dividends::{Dividend, example_dividends, normalize};
use crate::error::{FlexError, NormalizeError, PipelineError};
use crate::flex::FlexClient;
use crate::telemetry::metrics::EXAMPLE_DATA_FALLBACKS;

/// A configured Flex query: the client plus the query definition to run.
pub struct FlexQuery<'a> {
    pub client: &'a FlexClient,
    pub query_id: &'a str,
}

#[derive(Debug)]
pub struct RetrieveResult {
    pub dividends: Vec<Dividend>,
    pub used_example_data: bool,
}

/// Fetches and normalizes the dividend statement.
///
/// Falls back to the built-in example statement when no query is configured
/// or when fetching or normalizing fails; the failure is logged with its kind.
/// Cancellation is the one failure that does not fall back.
#[tracing::instrument(
    name = "pipeline_stage retrieve",
    skip(query),
    fields(
        pipeline.stage = "retrieve",
        dividends.count,
        dividends.example_data,
    )
)]
pub async fn retrieve(query: Option<FlexQuery<'_>>) -> Result<RetrieveResult, PipelineError> {
    let fetched = match query {
        Some(query) => {
            tracing::info!(query_id = %query.query_id, "Querying dividends from the Flex Web Service");
            match fetch(&query).await {
                Ok(dividends) => Some(dividends),
                Err(FetchError::Flex(FlexError::Cancelled)) => {
                    tracing::warn!("Flex query cancelled");
                    return Err(PipelineError::Cancelled);
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        error.type = err.reason(),
                        "Error getting dividends from IBKR"
                    );
                    EXAMPLE_DATA_FALLBACKS.add(1, &[KeyValue::new("reason", err.reason())]);
                    None
                }
            }
        }
        None => {
            tracing::warn!("Token or query id not configured, using example data");
            EXAMPLE_DATA_FALLBACKS.add(1, &[KeyValue::new("reason", "not_configured")]);
            None
        }
    };

    let result = match fetched {
        Some(dividends) => RetrieveResult {
            dividends,
            used_example_data: false,
        },
        None => RetrieveResult {
            dividends: example_data(),
            used_example_data: true,
        },
    };

    let span = tracing::Span::current();
    span.record("dividends.count", result.dividends.len());
    span.record("dividends.example_data", result.used_example_data);

    Ok(result)
}

#[derive(Debug, Error)]
enum FetchError {
    #[error(transparent)]
    Flex(#[from] FlexError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl FetchError {
    fn reason(&self) -> &'static str {
        match self {
            FetchError::Flex(err) => err.kind(),
            FetchError::Normalize(_) => "normalize",
        }
    }
}

async fn fetch(query: &FlexQuery<'_>) -> Result<Vec<Dividend>, FetchError> {
    let statement = query.client.execute_query(query.query_id).await?;
    let dividends = normalize(&statement)?;
    tracing::info!(count = dividends.len(), "Found dividends in statement");
    Ok(dividends)
}

fn example_data() -> Vec<Dividend> {
    tracing::info!("Using example data");
    example_dividends().unwrap_or_else(|err| {
        tracing::error!(error = %err, "Example statement could not be normalized");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::flex::testing::ScriptedTransport;
    use crate::flex::{FlexToken, PollSettings};

    fn client(bodies: Vec<&str>) -> FlexClient {
        FlexClient::new(
            Arc::new(ScriptedTransport::bodies(bodies)),
            FlexToken::new("tok"),
        )
        .with_poll_settings(PollSettings {
            max_attempts: 3,
            backoff: Duration::from_millis(10),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieve_without_query_uses_example_data() {
        let result = retrieve(None).await.unwrap();

        assert!(result.used_example_data);
        assert_eq!(result.dividends.len(), 2);
        assert_eq!(result.dividends[0].symbol, "ARE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieve_normalizes_fetched_statement() {
        let client = client(vec![
            "<R><ReferenceCode>1</ReferenceCode></R>",
            "<FlexQueryResponse><ChangeInDividendAccrual symbol=\"KO\" date=\"20250801\" \
             grossAmount=\"12.75\" netAmount=\"10.84\" tax=\"-1.91\" currency=\"USD\" \
             fxRateToBase=\"0.9\"/></FlexQueryResponse>",
        ]);

        let result = retrieve(Some(FlexQuery {
            client: &client,
            query_id: "42",
        }))
        .await
        .unwrap();

        assert!(!result.used_example_data);
        assert_eq!(result.dividends.len(), 1);
        assert_eq!(result.dividends[0].symbol, "KO");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieve_keeps_statement_with_dashed_dates() {
        let client = client(vec![
            "<R><ReferenceCode>1</ReferenceCode></R>",
            "<FlexQueryResponse><ChangeInDividendAccrual symbol=\"KO\" date=\"2025-08-01\" \
             grossAmount=\"12.75\" netAmount=\"10.84\" currency=\"USD\"/></FlexQueryResponse>",
        ]);

        let result = retrieve(Some(FlexQuery {
            client: &client,
            query_id: "42",
        }))
        .await
        .unwrap();

        assert!(!result.used_example_data);
        assert_eq!(result.dividends.len(), 1);
        assert_eq!(result.dividends[0].symbol, "KO");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieve_falls_back_on_flex_error() {
        let client = client(vec![
            "<R><ErrorMessage>Token is invalid.</ErrorMessage></R>",
        ]);

        let result = retrieve(Some(FlexQuery {
            client: &client,
            query_id: "42",
        }))
        .await
        .unwrap();

        assert!(result.used_example_data);
        assert_eq!(result.dividends.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieve_falls_back_on_bad_statement() {
        let client = client(vec![
            "<R><ReferenceCode>1</ReferenceCode></R>",
            "<R><ChangeInDividendAccrual symbol=\"KO\" grossAmount=\"n/a\"/></R>",
        ]);

        let result = retrieve(Some(FlexQuery {
            client: &client,
            query_id: "42",
        }))
        .await
        .unwrap();

        assert!(result.used_example_data);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieve_cancelled_does_not_fall_back() {
        let cancel = tokio_util::sync::CancellationToken::new();
        let client = client(vec![
            "<R><ReferenceCode>1</ReferenceCode></R>",
            "Statement generation in progress",
        ])
        .with_cancellation(cancel.clone());
        cancel.cancel();

        let err = retrieve(Some(FlexQuery {
            client: &client,
            query_id: "42",
        }))
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[test]
    fn test_fetch_error_reasons() {
        assert_eq!(
            FetchError::from(FlexError::Timeout { attempts: 3 }).reason(),
            "timeout"
        );
        let normalize_err = NormalizeError::Number {
            attribute: "tax",
            value: "x".into(),
        };
        assert_eq!(FetchError::from(normalize_err).reason(), "normalize");
    }
}
