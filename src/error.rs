use thiserror::Error;

/// Main error type for the titling server
#[derive(Error, Debug)]
pub enum TitlerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cannot read VTT file {path}: {source}")]
    VttRead {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TitlerError>;
