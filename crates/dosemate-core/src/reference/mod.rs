//! Read-only reference data: the drug catalog and the incompatibility matrix.

mod catalog;
mod matrix;

pub use catalog::*;
pub use matrix::*;

use thiserror::Error;

/// Reference data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate drug slug: {0}")]
    DuplicateSlug(String),

    #[error("Invalid preparation for {slug}: {reason}")]
    InvalidConcentration { slug: String, reason: String },
}

pub type DataResult<T> = Result<T, DataError>;
