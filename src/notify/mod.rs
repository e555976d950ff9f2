pub mod smtp;
pub mod stdout;

use crate::error::NotifyError;
use crate::report::RenderedReport;

pub use smtp::{SmtpNotifier, SmtpSettings};
pub use stdout::StdoutNotifier;

/// Destination for a rendered dividend report.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, report: &RenderedReport) -> Result<(), NotifyError>;
    fn name(&self) -> &str;
}
