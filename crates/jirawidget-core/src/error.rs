//! Error types for the widget core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("This issue is already being tracked: {0}")]
    Duplicate(String),

    #[error("Could not determine {0} directory")]
    NoDirectory(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
