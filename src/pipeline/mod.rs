pub mod orchestrator;
pub mod retrieve;

pub use orchestrator::{RunSummary, run};
pub use retrieve::{FlexQuery, RetrieveResult, retrieve};
