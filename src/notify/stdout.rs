use std::io::Write;

use crate::error::NotifyError;
use crate::report::RenderedReport;

use super::Notifier;

/// Prints the report as JSON instead of mailing it.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl StdoutNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, report: &RenderedReport) -> Result<(), NotifyError> {
        let stdout = std::io::stdout();
        write_report(&mut stdout.lock(), report)
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

fn write_report<W: Write>(out: &mut W, report: &RenderedReport) -> Result<(), NotifyError> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::report::render;

    #[test]
    fn test_write_report_is_json() {
        let dividends = crate::dividends::example_dividends().unwrap();
        let report = render(&dividends, NaiveDate::from_ymd_opt(2025, 7, 16).unwrap());
        let mut out = Vec::new();

        write_report(&mut out, &report).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["subject"], "💰 Dividendos del 15 de Julio de 2025");
        assert_eq!(value["dividends"].as_array().unwrap().len(), 2);
        assert_eq!(value["dividends"][0]["symbol"], "ARE");
    }
}
