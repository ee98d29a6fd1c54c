//! Error types for SHR models

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid cardinality: {0}")]
    InvalidCardinality(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
