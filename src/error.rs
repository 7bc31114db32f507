//! Error types for the integration pipeline.
//!
//! Only stage-level failures live here. Field-level coercion problems are
//! absorbed at the load boundary and surface as missing values instead.

use thiserror::Error;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, IntegrationError>;

#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Required columns absent from an input table (fatal, nothing is matched)
    #[error("{table} table is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        table: &'static str,
        columns: Vec<String>,
    },

    /// Matching configuration rejected before any work starts
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Output path would overwrite an input or has the wrong shape
    #[error("Unsafe output path: {0}")]
    UnsafeOutput(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
