//! Error types for the fallible edges of the crate (config and records files)
//!
//! Simulation outcomes never use these: a failed purchase or an empty magazine
//! is a `bool` or an enum, not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
