// ============================================================================
// recordstore
// ============================================================================
//
// A small record collection persisted as one JSON file and served over HTTP.
//
// - `storage`: the record store (fresh reads, serialized mutations, atomic
//   snapshot writes, explicit listing cache)
// - `validation`: turns untyped JSON into records and patches
// - `web`: axum router mapping store results to status codes

pub mod config;
pub mod core;
pub mod storage;
pub mod validation;
pub mod web;

pub use config::AppConfig;
pub use crate::core::{Record, RecordPatch, Result, StoreError, ValidationError, ValidationIssue};
pub use storage::{DurabilityMode, RecordStore, StoreOptions};
pub use web::{AppState, WebError, build_router};
