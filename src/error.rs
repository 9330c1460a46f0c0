// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MlogError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database Error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Editor exited with a non-zero status")]
    EditorError,
}

impl MlogError {
    /// Bad input from the user, as opposed to a failure of the tool itself.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, MlogError::InvalidDate(_) | MlogError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, MlogError>;
