use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read record file '{path}': {reason}")]
    ReadFailure { path: String, reason: String },

    #[error("Failed to write record file '{path}': {reason}")]
    WriteFailure { path: String, reason: String },

    #[error("Record with id {0} not found")]
    NotFound(i64),

    #[error("Record with id {0} already exists")]
    DuplicateId(i64),
}

impl StoreError {
    pub fn read_failure(path: &Path, reason: impl fmt::Display) -> Self {
        Self::ReadFailure {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write_failure(path: &Path, reason: impl fmt::Display) -> Self {
        Self::WriteFailure {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::ReadFailure { .. } | Self::WriteFailure { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub reason: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Rejected input payload.
///
/// Carries one issue per independently violated constraint so a client can
/// fix every problem in a single round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue::new(field, reason)])
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    /// Fields named by the issues, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation failed: ")?;
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
