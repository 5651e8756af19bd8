use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable {var} is not set")]
    MissingCredentials { var: &'static str },

    #[error("Cannot read credential file {path}: {reason}")]
    CredentialFile { path: String, reason: String },

    #[error("Query '{label}' is not in the catalog")]
    UnknownQuery { label: String },

    #[error("Column '{column}' not found in result '{label}'")]
    ColumnNotFound { label: String, column: String },

    #[error("Result '{label}' row {row} column '{column}': expected {expected}, got {actual}")]
    ColumnType {
        label: String,
        row: usize,
        column: String,
        expected: &'static str,
        actual: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type InsightsResult<T> = Result<T, InsightsError>;
