use chrono::NaiveDate;
use roxmltree::{Document, Node};

use crate::error::NormalizeError;
use crate::flex::Statement;

use super::{Dividend, DividendSource};

const DATE_FORMATS: [(&str, usize); 2] = [("%Y%m%d", 8), ("%Y-%m-%d", 10)];

/// Extracts dividends from a Flex statement.
///
/// `ChangeInDividendAccrual` rows come first, followed by `CashTransaction`
/// rows whose activity description mentions a dividend. Document order is
/// kept within each group.
#[tracing::instrument(
    name = "normalize statement",
    skip(statement),
    fields(
        statement.bytes = statement.as_str().len(),
        dividends.accruals,
        dividends.cash_transactions,
    )
)]
pub fn normalize(statement: &Statement) -> Result<Vec<Dividend>, NormalizeError> {
    let doc = Document::parse(statement.as_str())?;

    let mut dividends = doc
        .descendants()
        .filter(|node| node.has_tag_name("ChangeInDividendAccrual"))
        .map(|node| accrual(&node))
        .collect::<Result<Vec<_>, _>>()?;
    let accruals = dividends.len();

    for node in doc
        .descendants()
        .filter(|node| node.has_tag_name("CashTransaction"))
    {
        let description = attr(&node, "activityDescription");
        if description.to_lowercase().contains("dividend") {
            dividends.push(cash_transaction(&node, description)?);
        }
    }

    let span = tracing::Span::current();
    span.record("dividends.accruals", accruals);
    span.record("dividends.cash_transactions", dividends.len() - accruals);

    Ok(dividends)
}

fn accrual(node: &Node<'_, '_>) -> Result<Dividend, NormalizeError> {
    Ok(Dividend {
        symbol: attr(node, "symbol").to_string(),
        date: date(node, "date"),
        gross_amount: amount(node, "grossAmount", 0.0)?.abs(),
        tax: amount(node, "tax", 0.0)?,
        fee: amount(node, "fee", 0.0)?.abs(),
        net_amount: amount(node, "netAmount", 0.0)?.abs(),
        currency: attr(node, "currency").to_string(),
        fx_rate_to_base: amount(node, "fxRateToBase", 1.0)?,
        description: attr(node, "description").to_string(),
        ex_date: date(node, "exDate"),
        pay_date: date(node, "payDate"),
        source: DividendSource::Accrual,
    })
}

fn cash_transaction(node: &Node<'_, '_>, description: &str) -> Result<Dividend, NormalizeError> {
    let date = date(node, "dateTime");
    let value = amount(node, "amount", 0.0)?.abs();

    Ok(Dividend {
        symbol: attr(node, "symbol").to_string(),
        date,
        gross_amount: value,
        tax: 0.0,
        fee: 0.0,
        net_amount: value,
        currency: attr(node, "currency").to_string(),
        fx_rate_to_base: amount(node, "fxRateToBase", 1.0)?.abs(),
        description: description.to_string(),
        ex_date: None,
        pay_date: date,
        source: DividendSource::CashTransaction,
    })
}

fn attr<'a>(node: &Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or_default()
}

/// Numeric attribute; absent or blank yields `default`.
fn amount(node: &Node<'_, '_>, name: &'static str, default: f64) -> Result<f64, NormalizeError> {
    let raw = attr(node, name).trim();
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse().map_err(|_| NormalizeError::Number {
        attribute: name,
        value: raw.to_string(),
    })
}

/// Flex dates are `YYYYMMDD` or `YYYY-MM-DD`, optionally followed by a time
/// part. Anything else is logged and dropped so the row itself is kept.
fn date(node: &Node<'_, '_>, name: &'static str) -> Option<NaiveDate> {
    let raw = attr(node, name).trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = DATE_FORMATS.iter().find_map(|(format, len)| {
        raw.get(..*len)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, format).ok())
    });

    if parsed.is_none() {
        tracing::warn!(attribute = name, value = raw, "Unrecognized date in statement");
    }
    parsed
}
