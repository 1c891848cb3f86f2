use crate::scoring::{ConfigurationError, ScoringError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read or write data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dataset has no rows")]
    EmptyDataset,
    #[error("column '{0}' has no numeric values to impute from")]
    NoNumericValues(String),
    #[error("customer {customer} not found ({customers} customers loaded)")]
    CustomerNotFound { customer: usize, customers: usize },
    #[error("output path {} must name a .csv file", .0.display())]
    InvalidOutputPath(PathBuf),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}
