use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::dividends::Dividend;

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// `15 de Julio de 2025`
pub fn format_date(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} de {} de {}", date.day(), month, date.year())
}

/// Human label for the dates covered by `dividends`.
///
/// Up to three distinct dates are listed in order; more collapse into a
/// `first al last` range. Without any dated record, `fallback` is used.
pub fn dates_label(dividends: &[Dividend], fallback: NaiveDate) -> String {
    let dates: BTreeSet<NaiveDate> = dividends.iter().filter_map(|d| d.date).collect();

    let formatted: Vec<String> = dates.into_iter().map(format_date).collect();

    match formatted.as_slice() {
        [] => format_date(fallback),
        [single] => single.clone(),
        [first, .., last] if formatted.len() > 3 => format!("{first} al {last}"),
        _ => formatted.join(", "),
    }
}
