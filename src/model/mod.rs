//! Trained models and their signatures

mod signature;

pub use signature::{infer_signature, ColumnSpec, DType, ModelSignature};

use crate::data::Dataset;
use crate::Result;

/// A trained model that can be tracked.
///
/// Any model produced by a pipeline node implements this trait. The tracking
/// logger only needs `predict` to infer a signature from an input example.
pub trait Predictable: Send + Sync {
    /// Predict on a batch of records.
    ///
    /// # Errors
    ///
    /// Returns error if the input does not fit the model.
    fn predict(&self, input: &Dataset) -> Result<Dataset>;

    /// Model flavor reported to the tracking backend (e.g. "linear").
    fn flavor(&self) -> &str {
        "custom"
    }
}
