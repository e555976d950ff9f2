pub mod example;
pub mod normalize;

use chrono::NaiveDate;
use serde::Serialize;

pub use example::{example_dividends, example_statement};
pub use normalize::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendSource {
    Accrual,
    CashTransaction,
}

/// One dividend, normalized from a Flex statement row.
///
/// Amounts are in `currency`; multiply by `fx_rate_to_base` for the account's
/// base currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dividend {
    pub symbol: String,
    pub date: Option<NaiveDate>,
    pub gross_amount: f64,
    pub tax: f64,
    pub fee: f64,
    pub net_amount: f64,
    pub currency: String,
    pub fx_rate_to_base: f64,
    pub description: String,
    pub ex_date: Option<NaiveDate>,
    pub pay_date: Option<NaiveDate>,
    pub source: DividendSource,
}

impl Dividend {
    pub fn gross_in_base(&self) -> f64 {
        self.gross_amount.abs() * self.fx_rate_to_base
    }

    pub fn tax_in_base(&self) -> f64 {
        self.tax.abs() * self.fx_rate_to_base
    }

    pub fn net_in_base(&self) -> f64 {
        self.net_amount.abs() * self.fx_rate_to_base
    }
}
