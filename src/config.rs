use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::flex::{DEFAULT_BASE_URL, DEFAULT_VERSION, PollSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Smtp,
    Stdout,
}

impl FromStr for NotifierKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(NotifierKind::Smtp),
            "stdout" => Ok(NotifierKind::Stdout),
            _ => Err(ConfigError::UnknownNotifier(s.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub environment: String,
    pub flex_token: Option<String>,
    pub flex_query_id: Option<String>,
    pub flex_base_url: String,
    pub flex_version: String,
    pub poll: PollSettings,
    pub request_timeout: Duration,
    pub notifier: NotifierKind,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: Option<String>,
    pub recipient_email: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            flex_token: non_empty("IBKR_FLEX_TOKEN"),
            flex_query_id: non_empty("IBKR_DIVIDENDS_QUERY_ID"),
            flex_base_url: env::var("IBKR_FLEX_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            flex_version: env::var("IBKR_FLEX_VERSION")
                .unwrap_or_else(|_| DEFAULT_VERSION.to_string()),
            poll: PollSettings {
                max_attempts: parse_var("FLEX_POLL_MAX_ATTEMPTS", 30)?,
                backoff: Duration::from_secs(parse_var("FLEX_POLL_BACKOFF_SECS", 2)?),
            },
            request_timeout: Duration::from_secs(parse_var("FLEX_REQUEST_TIMEOUT_SECS", 30)?),
            notifier: env::var("NOTIFIER")
                .unwrap_or_else(|_| "smtp".to_string())
                .parse()?,
            smtp_server: env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: parse_var("SMTP_PORT", 587)?,
            sender_email: non_empty("SENDER_EMAIL"),
            recipient_email: non_empty("RECIPIENT_EMAIL"),
            smtp_username: non_empty("SMTP_USERNAME"),
            smtp_password: non_empty("SMTP_PASSWORD"),
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "flex-dividends".to_string()),
            otel_exporter_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Token and query id, when both are configured.
    pub fn flex_credentials(&self) -> Option<(&str, &str)> {
        match (&self.flex_token, &self.flex_query_id) {
            (Some(token), Some(query_id)) => Some((token.as_str(), query_id.as_str())),
            _ => None,
        }
    }
}

// Tokens and passwords stay out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("flex_token", &self.flex_token.as_ref().map(|_| "<redacted>"))
            .field("flex_query_id", &self.flex_query_id)
            .field("flex_base_url", &self.flex_base_url)
            .field("flex_version", &self.flex_version)
            .field("poll", &self.poll)
            .field("request_timeout", &self.request_timeout)
            .field("notifier", &self.notifier)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("sender_email", &self.sender_email)
            .field("recipient_email", &self.recipient_email)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "<redacted>"))
            .field("otel_service_name", &self.otel_service_name)
            .field("otel_exporter_endpoint", &self.otel_exporter_endpoint)
            .finish()
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_value(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}
