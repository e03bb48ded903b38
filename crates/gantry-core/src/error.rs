//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unrecognized flag kind '{kind}' on flag '{flag}'")]
    UnknownFlagKind { flag: String, kind: String },

    #[error("flag '{name}' does not yield a usable field name")]
    InvalidFlagName { name: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
