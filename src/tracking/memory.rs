//! In-memory tracking backend backed by [`ExperimentStore`].
//!
//! Nothing survives the process. Used for tests, demos, and pipelines that
//! read their tracking records back in-process.

use serde_json::{Map, Value};
use tracing::info;

use super::{RunHandle, TrackingBackend};
use crate::data::Dataset;
use crate::experiment::{
    ExperimentRecord, ExperimentStore, ModelRecord, ParamRecord, RunRecord, RunStatus,
};
use crate::model::{ModelSignature, Predictable};
use crate::{Error, Result};

const EXPERIMENT_ID: &str = "exp-0001";

/// In-memory tracking backend.
///
/// Runs are numbered `run-0001`, `run-0002`, ... in creation order. At most
/// one run is active at a time.
#[derive(Debug)]
pub struct InMemoryBackend {
    store: ExperimentStore,
    experiment_id: String,
    active_run: Option<String>,
    runs_created: u32,
}

impl InMemoryBackend {
    /// Create a backend tracking into a single experiment.
    #[must_use]
    pub fn new(experiment_name: impl Into<String>) -> Self {
        let experiment = ExperimentRecord::new(EXPERIMENT_ID, experiment_name);
        let mut store = ExperimentStore::new();
        store.add_experiment(experiment);

        Self {
            store,
            experiment_id: EXPERIMENT_ID.to_string(),
            active_run: None,
            runs_created: 0,
        }
    }

    /// Get the recorded experiment data.
    #[must_use]
    pub const fn store(&self) -> &ExperimentStore {
        &self.store
    }

    /// Get the experiment all runs belong to.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the active run ID, if a run is open.
    #[must_use]
    pub fn active_run(&self) -> Option<&str> {
        self.active_run.as_deref()
    }

    fn require_active_run(&self) -> Result<String> {
        self.active_run
            .clone()
            .ok_or_else(|| Error::Backend("no active run".to_string()))
    }
}

impl TrackingBackend for InMemoryBackend {
    fn start_run(&mut self, run_id: Option<&str>) -> Result<RunHandle> {
        if let Some(active) = &self.active_run {
            return Err(Error::Backend(format!(
                "run {active} is already active, end it before starting another"
            )));
        }

        let run_id = match run_id {
            Some(run_id) => {
                let run = self
                    .store
                    .get_run_mut(run_id)
                    .ok_or_else(|| Error::Backend(format!("run {run_id} not found")))?;
                run.start();
                info!(run_id, "Resumed run");
                run_id.to_string()
            }
            None => {
                self.runs_created += 1;
                let mut run =
                    RunRecord::new(format!("run-{:04}", self.runs_created), &self.experiment_id);
                run.start();
                let run_id = run.run_id().to_string();
                self.store.add_run(run);
                info!(run_id = %run_id, experiment_id = %self.experiment_id, "Started run");
                run_id
            }
        };

        self.active_run = Some(run_id.clone());
        Ok(RunHandle {
            run_id,
            experiment_id: self.experiment_id.clone(),
        })
    }

    fn end_run(&mut self, status: RunStatus) -> Result<()> {
        let run_id = self
            .active_run
            .take()
            .ok_or_else(|| Error::Backend("no active run to end".to_string()))?;
        if let Some(run) = self.store.get_run_mut(&run_id) {
            run.complete(status);
        }
        Ok(())
    }

    fn log_params(&mut self, params: &Map<String, Value>) -> Result<()> {
        let run_id = self.require_active_run()?;
        for (key, value) in params {
            self.store
                .add_param(ParamRecord::new(run_id.as_str(), key.as_str(), value.clone()))?;
        }
        Ok(())
    }

    fn log_model(
        &mut self,
        model: &dyn Predictable,
        name: &str,
        signature: Option<&ModelSignature>,
        input_example: Option<&Dataset>,
    ) -> Result<()> {
        let run_id = self.require_active_run()?;
        let example = input_example.map(Dataset::to_json).transpose()?;

        self.store.add_model(
            ModelRecord::new(run_id, name, model.flavor())
                .with_signature(signature.cloned())
                .with_input_example(example),
        );
        Ok(())
    }
}
