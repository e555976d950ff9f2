pub mod config;
pub mod dividends;
pub mod error;
pub mod flex;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod telemetry;

pub use error::{FlexError, NormalizeError, NotifyError};
pub use flex::{FlexClient, FlexToken, PollSettings, ReferenceCode, Statement};
