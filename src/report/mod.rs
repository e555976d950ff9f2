pub mod dates;
pub mod html;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dividends::Dividend;

pub use dates::{dates_label, format_date};

/// Sums converted to the account's base currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub gross: f64,
    pub tax: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedReport {
    pub subject: String,
    pub reference_date: NaiveDate,
    pub dates_label: String,
    pub totals: Totals,
    /// One rate per currency, in order of first appearance.
    pub exchange_rates: Vec<(String, f64)>,
    pub dividends: Vec<Dividend>,
    #[serde(skip)]
    pub html: String,
}

#[tracing::instrument(
    name = "render report",
    skip(dividends),
    fields(report.dividends = dividends.len(), report.subject)
)]
pub fn render(dividends: &[Dividend], reference_date: NaiveDate) -> RenderedReport {
    let label = dates_label(dividends, reference_date);
    let subject = format!("💰 Dividendos del {label}");

    let totals = dividends.iter().fold(Totals::default(), |acc, d| Totals {
        gross: acc.gross + d.gross_in_base(),
        tax: acc.tax + d.tax_in_base(),
        net: acc.net + d.net_in_base(),
    });

    let mut exchange_rates: Vec<(String, f64)> = Vec::new();
    for dividend in dividends {
        if !dividend.currency.is_empty()
            && !exchange_rates.iter().any(|(c, _)| *c == dividend.currency)
        {
            exchange_rates.push((dividend.currency.clone(), dividend.fx_rate_to_base));
        }
    }

    let html = html::render_html(dividends, &label, &totals, &exchange_rates);

    tracing::Span::current().record("report.subject", subject.as_str());

    RenderedReport {
        subject,
        reference_date,
        dates_label: label,
        totals,
        exchange_rates,
        dividends: dividends.to_vec(),
        html,
    }
}
