//! pipeline-core: Shared infrastructure for the mail-to-balance pipeline stages.
pub mod config;
pub mod error;
pub mod observability;
pub mod record;
pub mod unit;

pub use record::ExtractedRecord;
pub use serde;
pub use serde_json;
pub use tracing;
pub use unit::UnitOfWork;
