//! Param Record - one logged parameter of a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Param Record represents one parameter logged to a run.
///
/// Parameters are write-once per run: logging an existing key again with a
/// different value is rejected by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamRecord {
    run_id: String,
    key: String,
    value: Value,
    logged_at: DateTime<Utc>,
}

impl ParamRecord {
    /// Create a new param record.
    ///
    /// # Arguments
    ///
    /// * `run_id` - ID of the parent run
    /// * `key` - Parameter name (e.g., "alpha", "epochs")
    /// * `value` - Parameter value as loaded from the catalog
    #[must_use]
    pub fn new(run_id: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            run_id: run_id.into(),
            key: key.into(),
            value,
            logged_at: Utc::now(),
        }
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the parameter name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the parameter value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Get the timestamp when the parameter was logged.
    #[must_use]
    pub const fn logged_at(&self) -> DateTime<Utc> {
        self.logged_at
    }
}
