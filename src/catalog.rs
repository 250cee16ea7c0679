//! Catalog access
//!
//! The pipeline catalog maps dataset and parameter names to loaded values.
//! The tracking logger only reads the parameter mapping from it.

use std::collections::HashMap;

use serde_json::Value;

use crate::{Error, Result};

/// Name of the catalog entry holding the run's parameters.
pub const PARAMETERS_ENTRY: &str = "parameters";

/// Read access to a pipeline catalog.
pub trait Catalog {
    /// Load a catalog entry by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the entry does not exist or cannot be
    /// loaded.
    fn load(&self, name: &str) -> Result<Value>;
}

/// In-memory catalog.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use trueno_track::catalog::{Catalog, MemoryCatalog};
///
/// let catalog = MemoryCatalog::new().with_entry("parameters", json!({"alpha": 0.1}));
/// assert_eq!(catalog.load("parameters")?, json!({"alpha": 0.1}));
/// # Ok::<(), trueno_track::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    entries: HashMap<String, Value>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }
}

impl Catalog for MemoryCatalog {
    fn load(&self, name: &str) -> Result<Value> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Catalog(format!("no catalog entry named '{name}'")))
    }
}
