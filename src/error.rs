use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridfindError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Column '{column}' has no text accessor")]
    MissingAccessor { column: String },

    #[error("Invalid table '{}': {reason}", path.display())]
    InvalidTable { path: PathBuf, reason: String },

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("An unexpected error occurred: {0}")]
    Other(String),
}

impl From<anyhow::Error> for GridfindError {
    fn from(err: anyhow::Error) -> Self {
        GridfindError::Config(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, GridfindError>;
