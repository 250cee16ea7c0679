//! Event logger - tracks params and models from pipeline lifecycle events

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::PipelineHooks;
use crate::catalog::{Catalog, PARAMETERS_ENTRY};
use crate::config::{resolve, LoggingPolicy, ModelSpec, DEFAULT_NAMESPACE};
use crate::data::{Dataset, NodeData, NodeValue};
use crate::model::{infer_signature, ModelSignature, Predictable};
use crate::tracking::{with_run, TrackingBackend};
use crate::{Error, Result};

/// Run binding of the logger.
///
/// `Idle` until the first logging call starts a run, then `RunActive` for the
/// rest of the pipeline run so every record lands in the same run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoggerState {
    /// No run started yet
    #[default]
    Idle,
    /// Logging calls resume this run
    RunActive {
        /// Bound run ID
        run_id: String,
    },
}

impl LoggerState {
    /// Get the bound run ID, if any.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::RunActive { run_id } => Some(run_id.as_str()),
        }
    }

    fn bind(&mut self, run_id: &str) {
        if self.run_id() != Some(run_id) {
            debug!(run_id, "Bound tracking run");
            *self = Self::RunActive {
                run_id: run_id.to_string(),
            };
        }
    }
}

/// Pipeline hook that logs params and models to a tracking backend.
///
/// One logger serves one pipeline run: the policy is resolved when the
/// catalog is created and every logging call reuses the same run.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use trueno_track::catalog::MemoryCatalog;
/// use trueno_track::hooks::{EventLogger, PipelineHooks};
/// use trueno_track::tracking::InMemoryBackend;
///
/// let catalog = MemoryCatalog::new().with_entry(
///     "parameters",
///     json!({"alpha": 0.5, "trueno_track": {"models": ["regressor"]}}),
/// );
///
/// let mut logger = EventLogger::new(InMemoryBackend::new("house-prices"));
/// logger.after_catalog_created(&catalog)?;
///
/// let run_id = logger.state().run_id().unwrap().to_string();
/// assert_eq!(logger.backend().store().get_params_for_run(&run_id).len(), 1);
/// # Ok::<(), trueno_track::Error>(())
/// ```
#[derive(Debug)]
pub struct EventLogger<B: TrackingBackend> {
    backend: B,
    namespace: String,
    parameters_entry: String,
    policy: Option<LoggingPolicy>,
    state: LoggerState,
}

impl<B: TrackingBackend> EventLogger<B> {
    /// Create a logger with the default namespace and parameters entry.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::builder(backend).build()
    }

    /// Create a logger builder.
    #[must_use]
    pub fn builder(backend: B) -> EventLoggerBuilder<B> {
        EventLoggerBuilder::new(backend)
    }

    /// Get the resolved policy, once the catalog hook ran.
    #[must_use]
    pub const fn policy(&self) -> Option<&LoggingPolicy> {
        self.policy.as_ref()
    }

    /// Get the run binding.
    #[must_use]
    pub const fn state(&self) -> &LoggerState {
        &self.state
    }

    /// Get the tracking backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the logger, returning the tracking backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Load the run's parameters from the catalog and log them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the parameters entry is missing,
    /// [`Error::Config`] if it is not a mapping or the tracking
    /// configuration is malformed, and any backend error from logging.
    pub fn on_catalog_created(&mut self, catalog: &dyn Catalog) -> Result<()> {
        info!(namespace = %self.namespace, "Initializing tracking logger");

        match catalog.load(&self.parameters_entry)? {
            Value::Object(params) => self.on_parameters_loaded(params),
            _ => Err(Error::Config(format!(
                "catalog entry '{}' must be a mapping",
                self.parameters_entry
            ))),
        }
    }

    /// Resolve the policy from a loaded parameter mapping and log the
    /// selected parameters when tracking is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the tracking configuration is malformed,
    /// and any backend error from logging.
    pub fn on_parameters_loaded(&mut self, mut params: Map<String, Value>) -> Result<()> {
        let policy = resolve(&mut params, &self.namespace)?;
        let enabled = policy.enabled();
        let selected = policy.effective_params();
        self.policy = Some(policy);

        if !enabled {
            info!("Tracking disabled, nothing will be logged");
            return Ok(());
        }

        info!(count = selected.len(), "Logging params");
        self.within_run(|backend| backend.log_params(&selected))
    }

    /// Log every node output tracked as a model, in output name order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PolicyNotResolved`] if called before the catalog
    /// hook, [`Error::NotAModel`] if a tracked output is not a model, and
    /// any prediction or backend error.
    pub fn on_node_completed(&mut self, inputs: &NodeData, outputs: &NodeData) -> Result<()> {
        let policy = self.policy.as_ref().ok_or(Error::PolicyNotResolved)?;
        if !policy.enabled() {
            return Ok(());
        }

        let tracked: Vec<(String, ModelSpec)> = outputs
            .keys()
            .filter_map(|output| {
                policy
                    .model_spec(output)
                    .map(|spec| (output.clone(), spec.clone()))
            })
            .collect();

        for (output, spec) in tracked {
            self.log_model(&output, &spec, outputs, inputs)?;
        }
        Ok(())
    }

    fn log_model(
        &mut self,
        output: &str,
        spec: &ModelSpec,
        outputs: &NodeData,
        inputs: &NodeData,
    ) -> Result<()> {
        let model = outputs
            .get(output)
            .and_then(NodeValue::as_model)
            .ok_or_else(|| Error::NotAModel(output.to_string()))?;

        let (signature, example) = signature_and_example(spec, model, inputs)?;

        info!(output, name = spec.name(), example = ?example, "Logging model");
        self.within_run(|backend| {
            backend.log_model(model, spec.name(), signature.as_ref(), example.as_ref())
        })
    }

    /// Run a logging call in a scope on the bound run, binding it first if
    /// the logger is still idle.
    fn within_run<T>(&mut self, f: impl FnOnce(&mut B) -> Result<T>) -> Result<T> {
        let run_id = self.state.run_id().map(str::to_string);
        let state = &mut self.state;

        with_run(&mut self.backend, run_id.as_deref(), |run, backend| {
            state.bind(&run.run_id);
            f(backend)
        })
    }
}

/// Derive the input example and signature for a model.
///
/// Both are `None` unless the spec references an input holding at least one
/// data record. A signature that cannot be inferred from the example is
/// dropped with a warning; the example is kept.
fn signature_and_example(
    spec: &ModelSpec,
    model: &dyn Predictable,
    inputs: &NodeData,
) -> Result<(Option<ModelSignature>, Option<Dataset>)> {
    let example = spec
        .input_ref()
        .and_then(|input| inputs.get(input))
        .and_then(NodeValue::as_data)
        .and_then(Dataset::first_element);

    let Some(example) = example else {
        debug!(
            input = spec.input_ref(),
            "No input example, logging model without signature"
        );
        return Ok((None, None));
    };

    let prediction = model.predict(&example)?;
    let signature = match infer_signature(&example, &prediction) {
        Ok(signature) => Some(signature),
        Err(Error::Signature(reason)) => {
            warn!(
                input = spec.input_ref(),
                %reason,
                "Cannot infer signature, logging model without it"
            );
            None
        }
        Err(e) => return Err(e),
    };
    Ok((signature, Some(example)))
}

impl<B: TrackingBackend> PipelineHooks for EventLogger<B> {
    fn after_catalog_created(&mut self, catalog: &dyn Catalog) -> Result<()> {
        self.on_catalog_created(catalog)
    }

    fn after_node_run(&mut self, inputs: &NodeData, outputs: &NodeData) -> Result<()> {
        self.on_node_completed(inputs, outputs)
    }
}

/// Builder for `EventLogger`.
#[derive(Debug)]
pub struct EventLoggerBuilder<B: TrackingBackend> {
    backend: B,
    namespace: String,
    parameters_entry: String,
}

impl<B: TrackingBackend> EventLoggerBuilder<B> {
    /// Create a builder with the default namespace and parameters entry.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            namespace: DEFAULT_NAMESPACE.to_string(),
            parameters_entry: PARAMETERS_ENTRY.to_string(),
        }
    }

    /// Set the reserved parameter key holding the tracking configuration.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the catalog entry the parameters are loaded from.
    #[must_use]
    pub fn parameters_entry(mut self, entry: impl Into<String>) -> Self {
        self.parameters_entry = entry.into();
        self
    }

    /// Build the `EventLogger`.
    #[must_use]
    pub fn build(self) -> EventLogger<B> {
        EventLogger {
            backend: self.backend,
            namespace: self.namespace,
            parameters_entry: self.parameters_entry,
            policy: None,
            state: LoggerState::Idle,
        }
    }
}
