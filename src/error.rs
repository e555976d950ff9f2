use thiserror::Error;

/// Failure of the Flex Web Service exchange.
///
/// Every variant is terminal for the current query. The only condition the
/// poller retries is "statement generation in progress", which never surfaces
/// as an error unless the attempt budget runs out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlexError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Flex service error: {0}")]
    Server(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Statement not generated after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Flex query cancelled")]
    Cancelled,
}

impl FlexError {
    /// Stable label used for log fields and metric attributes.
    pub fn kind(&self) -> &'static str {
        match self {
            FlexError::Transport(_) => "transport",
            FlexError::Server(_) => "server_error",
            FlexError::MalformedResponse(_) => "malformed_response",
            FlexError::Timeout { .. } => "timeout",
            FlexError::Cancelled => "cancelled",
        }
    }
}

// The request URL carries the token as a query parameter, so it is dropped.
impl From<reqwest::Error> for FlexError {
    fn from(err: reqwest::Error) -> Self {
        FlexError::Transport(err.without_url().to_string())
    }
}

impl From<roxmltree::Error> for FlexError {
    fn from(err: roxmltree::Error) -> Self {
        FlexError::MalformedResponse(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Statement is not valid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid number in {attribute}: {value:?}")]
    Number { attribute: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid mailbox {address:?}: {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Run cancelled before the statement was retrieved")]
    Cancelled,

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Unknown notifier {0:?}, expected \"smtp\" or \"stdout\"")]
    UnknownNotifier(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_keeps_message_verbatim() {
        let error = FlexError::Server("Invalid token".to_string());
        assert_eq!(error.to_string(), "Flex service error: Invalid token");
    }

    #[test]
    fn test_timeout_error() {
        let error = FlexError::Timeout { attempts: 30 };
        assert_eq!(error.to_string(), "Statement not generated after 30 attempts");
    }

    #[test]
    fn test_error_kinds() {
        let test_cases = vec![
            (FlexError::Transport("refused".into()), "transport"),
            (FlexError::Server("bad".into()), "server_error"),
            (FlexError::MalformedResponse("empty".into()), "malformed_response"),
            (FlexError::Timeout { attempts: 1 }, "timeout"),
            (FlexError::Cancelled, "cancelled"),
        ];

        for (error, expected) in test_cases {
            assert_eq!(error.kind(), expected, "kind of {error:?}");
        }
    }

    #[test]
    fn test_xml_error_is_malformed_response() {
        let err = roxmltree::Document::parse("<open>").unwrap_err();
        let error = FlexError::from(err);
        assert_eq!(error.kind(), "malformed_response");
    }

    #[test]
    fn test_config_error_message() {
        let error = ConfigError::InvalidNumber {
            name: "SMTP_PORT",
            value: "abc".into(),
        };
        assert_eq!(error.to_string(), "SMTP_PORT must be a number, got \"abc\"");
    }
}
