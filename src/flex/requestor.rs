use roxmltree::Document;

use crate::error::FlexError;

use super::{FlexToken, ReferenceCode, Transport, endpoint, xml};

pub const SEND_REQUEST_SERVICE: &str = "FlexStatementService.SendRequest";

/// Asks the service to start generating the statement for `query_id`.
///
/// Performs exactly one round trip. The response must carry either an
/// `ErrorMessage` (returned as [`FlexError::Server`]) or a non-empty
/// `ReferenceCode`; anything else is [`FlexError::MalformedResponse`].
#[tracing::instrument(
    name = "flex submit",
    skip(transport, token),
    fields(
        flex.query_id = %query_id,
        flex.version = %version,
        flex.reference_code,
    )
)]
pub async fn submit(
    transport: &dyn Transport,
    base_url: &str,
    token: &FlexToken,
    query_id: &str,
    version: &str,
) -> Result<ReferenceCode, FlexError> {
    let url = endpoint(base_url, SEND_REQUEST_SERVICE);
    let body = transport
        .get(
            &url,
            &[("t", token.expose()), ("q", query_id), ("v", version)],
        )
        .await?;

    let doc = Document::parse(&body)?;

    if let Some(message) = xml::error_message(&doc) {
        return Err(FlexError::Server(message));
    }

    match xml::element_text(&doc, "ReferenceCode") {
        Some(code) if !code.is_empty() => {
            tracing::Span::current().record("flex.reference_code", code.as_str());
            tracing::debug!(reference_code = %code, "Statement request accepted");
            Ok(ReferenceCode::new(code))
        }
        Some(_) => Err(FlexError::MalformedResponse(
            "ReferenceCode element is empty".into(),
        )),
        None => Err(FlexError::MalformedResponse(
            "response has neither ErrorMessage nor ReferenceCode".into(),
        )),
    }
}
