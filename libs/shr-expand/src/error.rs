//! Error types for expansion hosts
//!
//! Domain problems found while expanding (bad overrides, unresolvable
//! references, ...) are never errors here: they are collected as
//! [`ExpansionIssue`](crate::ExpansionIssue)s. This type covers failures of
//! the surrounding plumbing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model error: {0}")]
    Model(#[from] shr_models::Error),
}
