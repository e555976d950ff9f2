use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::error::NotifyError;
use crate::report::RenderedReport;

use super::Notifier;

#[derive(Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipient: String,
}

impl SmtpSettings {
    /// `None` unless sender, recipient, username and password are all set.
    pub fn from_config(config: &Config) -> Option<Self> {
        Some(Self {
            server: config.smtp_server.clone(),
            port: config.smtp_port,
            username: config.smtp_username.clone()?,
            password: config.smtp_password.clone()?,
            sender: config.sender_email.clone()?,
            recipient: config.recipient_email.clone()?,
        })
    }
}

/// Sends the report as an HTML email through a STARTTLS relay.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            mailer,
            from: mailbox(&settings.sender)?,
            to: mailbox(&settings.recipient)?,
        })
    }

    fn message(&self, report: &RenderedReport) -> Result<Message, NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(report.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(report.html.clone())?;
        Ok(message)
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    #[tracing::instrument(
        name = "notify smtp",
        skip(self, report),
        fields(mail.to = %self.to, mail.subject = %report.subject)
    )]
    async fn send(&self, report: &RenderedReport) -> Result<(), NotifyError> {
        let message = self.message(report)?;

        tracing::info!(recipient = %self.to, "Sending dividend email");
        self.mailer.send(message).await?;
        tracing::info!("Dividend email sent");

        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}
