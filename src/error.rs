//! Error types for the KPI pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source '{locator}' could not be fetched: {reason}")]
    Source { locator: String, reason: String },

    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{count} payment rows reference unknown contracts (first: {first})")]
    UnmatchedPayments { count: usize, first: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type KpiResult<T> = Result<T, KpiError>;
