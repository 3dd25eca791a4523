pub mod core;
pub mod driver;
pub mod edgar;
pub mod error;
pub mod fetch;
pub mod storage;

// Re-exports
pub use crate::core::config::NportConfig;
pub use driver::{run, RunSummary};
pub use edgar::index::IndexRecord;
pub use edgar::nport::{extract_filing, Holding, NportFiling};
pub use error::{Error, Result};
