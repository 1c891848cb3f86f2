use thiserror::Error;

/// Raised while building a rule engine or scorer; always fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("rule for field '{field}' is malformed: {reason}")]
    Malformed { field: String, reason: String },
    #[error("field '{0}' is configured more than once")]
    DuplicateField(String),
    #[error("risk tier list cannot be empty")]
    EmptyTiers,
    #[error("unable to parse rule configuration: {0}")]
    Parse(String),
}

/// Shape problems in the data handed to the scorer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("record cannot be empty")]
    EmptyRecord,
    #[error("record batch cannot be empty")]
    EmptyBatch,
    #[error("score {0} is outside the 0-100 range")]
    ScoreOutOfRange(i64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("record is missing field '{column}' required by rule '{field}'")]
    FieldLookup { field: String, column: String },
}
