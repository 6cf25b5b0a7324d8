//! Error types for the import pipeline.
//!
//! Two families live here:
//!
//! - [`ImportError`] is *data*: one entry in the per-file error list handed
//!   back to the caller alongside whatever products could be built. It is never
//!   returned through `Err`.
//! - [`RepositoryError`] is an operational failure raised by a
//!   [`ProductRepository`](crate::ProductRepository) while submitting a record.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How much of the batch an [`ImportError`] invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorLevel {
    /// The file cannot be mapped at all; no row was processed.
    Schema,
    /// One row (or one product group) was excluded.
    Row,
    /// One value was defaulted; the row still produced a record.
    Field,
}

/// A problem found while importing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    /// 1-based data row number; `0` for schema-level errors.
    pub row: usize,
    /// Logical field the problem relates to.
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// Granularity of the failure.
    pub level: ErrorLevel,
}

impl ImportError {
    /// A schema-level error (always row 0).
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row: 0,
            field: field.into(),
            message: message.into(),
            level: ErrorLevel::Schema,
        }
    }

    /// A row-level error that excludes the row from the output.
    pub fn row(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
            level: ErrorLevel::Row,
        }
    }

    /// A field-level error whose value was defaulted.
    pub fn field(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
            level: ErrorLevel::Field,
        }
    }

    /// Whether this error aborted the whole batch.
    #[must_use]
    pub fn is_schema(&self) -> bool {
        self.level == ErrorLevel::Schema
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.row == 0 {
            write!(f, "{}: {}", self.field, self.message)
        } else {
            write!(f, "row {} ({}): {}", self.row, self.field, self.message)
        }
    }
}

/// Errors a [`ProductRepository`](crate::ProductRepository) can report for a
/// single create request.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store refused the record (validation, duplicate handle, ...).
    #[error("rejected: {0}")]
    Rejected(String),

    /// The request never got a usable answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered with something we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The record could not be encoded for submission.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
