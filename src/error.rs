use serde::{Deserialize, Serialize};
use std::fmt;

/// One offending field of a city record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("invalid city record: {}", join_fields(.0))]
    InvalidRecord(Vec<FieldError>),
}

impl RecordError {
    pub fn fields(&self) -> &[FieldError] {
        match self {
            RecordError::InvalidRecord(fields) => fields,
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().iter().any(|error| error.field == field)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    InvalidRecord(#[from] RecordError),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("invalid value {value} for scenario {scenario}: {reason}")]
    InvalidScenarioValue {
        scenario: String,
        value: f64,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model is not trained")]
    Untrained,

    #[error("need at least {required} labeled cities to train, got {found}")]
    InsufficientTrainingData { required: usize, found: usize },

    #[error("got {records} records but {targets} target scores")]
    TargetCountMismatch { records: usize, targets: usize },

    #[error("target score at index {index} is not a finite number")]
    InvalidTarget { index: usize },

    #[error(transparent)]
    InvalidRecord(#[from] RecordError),

    #[error("failed to access model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode model: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported input format: {0} (use .csv or .json)")]
    UnsupportedFormat(String),

    #[error("row {row}: {source}")]
    Row { row: usize, source: RecordError },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode store: {0}")]
    Json(#[from] serde_json::Error),

    #[error("city not found: {0}")]
    NotFound(String),
}
