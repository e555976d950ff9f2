use opentelemetry::KeyValue;
use roxmltree::Document;
use tokio_util::sync::CancellationToken;

use crate::error::FlexError;
use crate::telemetry::metrics::FLEX_POLL_ATTEMPTS;

use super::{
    FlexToken, IN_PROGRESS_MARKER, PollSettings, ReferenceCode, Statement, Transport, endpoint,
    xml,
};

pub const GET_STATEMENT_SERVICE: &str = "FlexStatementService.GetStatement";

/// Fetches the statement for `reference`, waiting while the server is still
/// generating it.
///
/// Only the in-progress answer is retried, at a fixed `settings.backoff`
/// interval and for at most `settings.max_attempts` requests. Transport
/// failures, `ErrorMessage` responses and unparseable bodies end the loop
/// immediately. `cancel` is checked before every request and interrupts the
/// backoff sleep.
#[tracing::instrument(
    name = "flex poll",
    skip(transport, token, reference, cancel),
    fields(
        flex.reference_code = %reference.as_str(),
        flex.max_attempts = settings.max_attempts,
        flex.attempts,
    )
)]
pub async fn poll(
    transport: &dyn Transport,
    base_url: &str,
    token: &FlexToken,
    reference: ReferenceCode,
    version: &str,
    settings: &PollSettings,
    cancel: &CancellationToken,
) -> Result<Statement, FlexError> {
    let url = endpoint(base_url, GET_STATEMENT_SERVICE);
    let params = [("t", token.expose()), ("q", reference.as_str()), ("v", version)];

    let mut attempts = 0;
    let result = poll_loop(transport, &url, &params, settings, cancel, &mut attempts).await;

    tracing::Span::current().record("flex.attempts", attempts);
    let outcome = match &result {
        Ok(_) => "done",
        Err(err) => err.kind(),
    };
    FLEX_POLL_ATTEMPTS.record(u64::from(attempts), &[KeyValue::new("flex.outcome", outcome)]);

    result
}

async fn poll_loop(
    transport: &dyn Transport,
    url: &str,
    params: &[(&str, &str)],
    settings: &PollSettings,
    cancel: &CancellationToken,
    attempts: &mut u32,
) -> Result<Statement, FlexError> {
    while *attempts < settings.max_attempts {
        if cancel.is_cancelled() {
            return Err(FlexError::Cancelled);
        }

        *attempts += 1;
        let body = transport.get(url, params).await?;

        // The in-progress answer is itself an XML error document, so the
        // marker has to be checked before looking for ErrorMessage.
        if body.contains(IN_PROGRESS_MARKER) {
            tracing::debug!(
                attempt = *attempts,
                max_attempts = settings.max_attempts,
                "Statement generation in progress"
            );

            if *attempts < settings.max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(FlexError::Cancelled),
                    _ = tokio::time::sleep(settings.backoff) => {}
                }
            }
            continue;
        }

        if let Some(message) = xml::error_message(&Document::parse(&body)?) {
            return Err(FlexError::Server(message));
        }

        tracing::debug!(attempt = *attempts, bytes = body.len(), "Statement ready");
        return Ok(Statement::new(body));
    }

    Err(FlexError::Timeout {
        attempts: settings.max_attempts,
    })
}
