//! Error types for trueno-track
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trueno-track error types
#[derive(Error, Debug)]
pub enum Error {
    /// Tracking configuration is malformed (fatal at catalog creation)
    #[error("Configuration error: {0}\nNo pipeline node will run until the tracking configuration is fixed")]
    Config(String),

    /// Catalog entry missing or unreadable
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Tracking backend failure (connectivity, serialization, run lifecycle)
    #[error("Tracking backend error: {0}")]
    Backend(String),

    /// A node output declared as a model is not a model value
    #[error("Output '{0}' is declared as a model but is not a model value")]
    NotAModel(String),

    /// The model failed to predict on its input example
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// Signature inference failed
    #[error("Signature inference failed: {0}")]
    Signature(String),

    /// Node hook invoked before the catalog hook resolved a policy
    #[error("Logging policy not resolved: after_catalog_created must run before any node hook")]
    PolicyNotResolved,

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
