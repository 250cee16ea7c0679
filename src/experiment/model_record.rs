//! Model Record - a model registered under a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ModelSignature;

/// Model Record represents a trained model logged to a run.
///
/// The signature and input example are only present when the model was
/// logged with a resolvable input reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelRecord {
    run_id: String,
    name: String,
    flavor: String,
    signature: Option<ModelSignature>,
    input_example: Option<Value>,
    created_at: DateTime<Utc>,
}

impl ModelRecord {
    /// Create a new model record without signature or input example.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the parent run
    /// * `name` - Registration name (artifact path) of the model
    /// * `flavor` - Model flavor reported by the model
    #[must_use]
    pub fn new(run_id: impl Into<String>, name: impl Into<String>, flavor: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            name: name.into(),
            flavor: flavor.into(),
            signature: None,
            input_example: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a signature, builder style.
    #[must_use]
    pub fn with_signature(mut self, signature: Option<ModelSignature>) -> Self {
        self.signature = signature;
        self
    }

    /// Attach an input example rendered as JSON, builder style.
    #[must_use]
    pub fn with_input_example(mut self, example: Option<Value>) -> Self {
        self.input_example = example;
        self
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the registration name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the model flavor.
    #[must_use]
    pub fn flavor(&self) -> &str {
        &self.flavor
    }

    /// Get the signature, if one was inferred.
    #[must_use]
    pub const fn signature(&self) -> Option<&ModelSignature> {
        self.signature.as_ref()
    }

    /// Get the input example, if one was derived.
    #[must_use]
    pub const fn input_example(&self) -> Option<&Value> {
        self.input_example.as_ref()
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_record_new() {
        let model = ModelRecord::new("run-0001", "price_model", "linear");
        assert_eq!(model.run_id(), "run-0001");
        assert_eq!(model.name(), "price_model");
        assert_eq!(model.flavor(), "linear");
        assert!(model.signature().is_none());
        assert!(model.input_example().is_none());
    }

    #[test]
    fn test_model_record_with_example() {
        let model = ModelRecord::new("run-0001", "price_model", "linear")
            .with_input_example(Some(json!([{"sqft": 1200.0}])));
        assert_eq!(model.input_example(), Some(&json!([{"sqft": 1200.0}])));
    }
}
