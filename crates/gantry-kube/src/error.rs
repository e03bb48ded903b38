//! Error types for gantry-kube

use gantry_core::CoreError;
use thiserror::Error;

/// Result type for gantry-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while reconciling schemas
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Schema not found in the store
    #[error("schema '{name}' not found")]
    SchemaNotFound { name: String },

    /// Schema already exists in the store
    #[error("schema '{name}' already exists")]
    SchemaAlreadyExists { name: String },

    /// Optimistic-concurrency conflict on a schema write
    #[error("conflicting write to schema '{name}'")]
    Conflict { name: String },

    /// Storage error
    #[error("storage error: {0}")]
    Store(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Driver staging or installation failed
    #[error("driver '{driver}' install failed: {message}")]
    Install { driver: String, message: String },

    /// Flag translation error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for KubeError {
    fn from(e: serde_json::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl KubeError {
    /// Check if this is a not-found signal (benign on the read path)
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::SchemaNotFound { .. })
    }

    /// Check if this is an already-exists signal (benign on sub-schema create)
    pub fn is_already_exists(&self) -> bool {
        matches!(self, KubeError::SchemaAlreadyExists { .. })
    }

    /// Check if this is an optimistic-concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, KubeError::Conflict { .. })
    }
}
