use chrono::NaiveDate;
use opentelemetry::KeyValue;

use crate::error::PipelineError;
use crate::notify::Notifier;
use crate::report;
use crate::telemetry::metrics::{DIVIDENDS_FOUND, NOTIFICATIONS_SENT};

use super::retrieve::{FlexQuery, retrieve};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub dividends: usize,
    pub used_example_data: bool,
    pub delivered: bool,
}

/// Retrieves dividends, renders the summary and hands it to `notifier`.
///
/// `today` is the reference date shown when no record carries a date. With
/// no notifier, or no dividends, nothing is delivered.
#[tracing::instrument(
    name = "pipeline dividends",
    skip(query, notifier),
    fields(
        dividends.count,
        notifier = notifier.map(|n| n.name()).unwrap_or("none"),
    )
)]
pub async fn run(
    query: Option<FlexQuery<'_>>,
    notifier: Option<&dyn Notifier>,
    today: NaiveDate,
) -> Result<RunSummary, PipelineError> {
    let data = retrieve(query).await?;
    let count = data.dividends.len();

    tracing::Span::current().record("dividends.count", count);
    DIVIDENDS_FOUND.record(
        count as u64,
        &[KeyValue::new("example_data", data.used_example_data)],
    );
    tracing::info!(count, example_data = data.used_example_data, "Dividends retrieved");

    let mut summary = RunSummary {
        dividends: count,
        used_example_data: data.used_example_data,
        delivered: false,
    };

    if data.dividends.is_empty() {
        tracing::info!("No dividends found in the statement, nothing to send");
        return Ok(summary);
    }

    let Some(notifier) = notifier else {
        tracing::warn!("No notifier available, skipping delivery");
        return Ok(summary);
    };

    let rendered = report::render(&data.dividends, today);
    notifier.send(&rendered).await?;

    NOTIFICATIONS_SENT.add(1, &[KeyValue::new("notifier", notifier.name().to_string())]);
    summary.delivered = true;

    Ok(summary)
}
