pub mod error;
pub mod types;

pub use error::{Result, StoreError, ValidationError, ValidationIssue};
pub use types::{Record, RecordPatch};
