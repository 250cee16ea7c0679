//! Logging Policy - normalized decision of what to track for one run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a node output is registered as a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSpec {
    name: String,
    input_ref: Option<String>,
}

impl ModelSpec {
    /// Create a model spec.
    ///
    /// An empty `name` is replaced by `output`, so a spec never carries an
    /// empty registration name.
    ///
    /// # Arguments
    ///
    /// * `output` - Node output name the spec is keyed by
    /// * `name` - Registration name requested by the user, if any
    /// * `input_ref` - Node input used to derive an input example
    #[must_use]
    pub fn new(output: &str, name: Option<&str>, input_ref: Option<String>) -> Self {
        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => output.to_string(),
        };
        Self { name, input_ref }
    }

    /// Get the registration name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the input reference used for the input example, if any.
    #[must_use]
    pub fn input_ref(&self) -> Option<&str> {
        self.input_ref.as_deref()
    }
}

/// Logging Policy resolved once per pipeline run.
///
/// Built by [`resolve`](super::resolve) from the loaded parameter mapping
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingPolicy {
    pub(super) enabled: bool,
    pub(super) project_params: Map<String, Value>,
    pub(super) parameter_selection: Option<Vec<String>>,
    pub(super) model_specs: BTreeMap<String, ModelSpec>,
    pub(super) dataset_selection: Option<Vec<String>>,
    pub(super) metric_selection: Option<Vec<String>>,
    pub(super) artifact_selection: Option<Vec<String>>,
    pub(super) tags: Map<String, Value>,
}

impl LoggingPolicy {
    /// Policy used when no tracking configuration is present:
    /// every project parameter is logged and no model is.
    #[must_use]
    pub fn log_all(project_params: Map<String, Value>) -> Self {
        Self {
            enabled: true,
            project_params,
            parameter_selection: None,
            model_specs: BTreeMap::new(),
            dataset_selection: None,
            metric_selection: None,
            artifact_selection: None,
            tags: Map::new(),
        }
    }

    /// Whether any logging happens at all.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Parameters left after removing the tracking namespace.
    #[must_use]
    pub const fn project_params(&self) -> &Map<String, Value> {
        &self.project_params
    }

    /// Parameter names requested by the user; `None` means all of them.
    #[must_use]
    pub fn parameter_selection(&self) -> Option<&[String]> {
        self.parameter_selection.as_deref()
    }

    /// Model specs keyed by node output name.
    #[must_use]
    pub const fn model_specs(&self) -> &BTreeMap<String, ModelSpec> {
        &self.model_specs
    }

    /// Get the spec for a node output, if it is tracked as a model.
    #[must_use]
    pub fn model_spec(&self, output: &str) -> Option<&ModelSpec> {
        self.model_specs.get(output)
    }

    /// Dataset names listed under `datasets` (parsed, not acted on).
    #[must_use]
    pub fn dataset_selection(&self) -> Option<&[String]> {
        self.dataset_selection.as_deref()
    }

    /// Metric names listed under `metrics` (parsed, not acted on).
    #[must_use]
    pub fn metric_selection(&self) -> Option<&[String]> {
        self.metric_selection.as_deref()
    }

    /// Artifact names listed under `artifacts` (parsed, not acted on).
    #[must_use]
    pub fn artifact_selection(&self) -> Option<&[String]> {
        self.artifact_selection.as_deref()
    }

    /// Tags listed under `tags` (parsed, not acted on).
    #[must_use]
    pub const fn tags(&self) -> &Map<String, Value> {
        &self.tags
    }

    /// Parameters to send to the tracking backend.
    ///
    /// The selection is intersected with the project parameters: unknown
    /// names are dropped and an empty selection yields an empty mapping.
    #[must_use]
    pub fn effective_params(&self) -> Map<String, Value> {
        match &self.parameter_selection {
            None => self.project_params.clone(),
            Some(selection) => self
                .project_params
                .iter()
                .filter(|(name, _)| selection.iter().any(|s| s == *name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}
