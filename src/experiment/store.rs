//! Experiment Store - in-memory storage for experiment tracking data
//!
//! This module provides the storage layer behind the in-memory tracking
//! backend.

use std::collections::HashMap;

use super::{ExperimentRecord, ModelRecord, ParamRecord, RunRecord};
use crate::{Error, Result};

/// In-memory store for experiment tracking data.
///
/// ## Design
///
/// The store uses hash maps for O(1) lookups by ID. Params and models are
/// kept in insertion order so a run's records read back the way they were
/// logged.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    experiments: HashMap<String, ExperimentRecord>,
    runs: HashMap<String, RunRecord>,
    params: Vec<ParamRecord>,
    models: Vec<ModelRecord>,
}

impl ExperimentStore {
    /// Create a new empty experiment store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store is empty (no experiments, runs, params or models).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
            && self.runs.is_empty()
            && self.params.is_empty()
            && self.models.is_empty()
    }

    /// Get the number of experiments in the store.
    #[must_use]
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Get the number of runs in the store.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Get the number of params in the store.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Get the number of models in the store.
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Add an experiment to the store.
    pub fn add_experiment(&mut self, experiment: ExperimentRecord) {
        self.experiments
            .insert(experiment.experiment_id().to_string(), experiment);
    }

    /// Get an experiment by ID.
    #[must_use]
    pub fn get_experiment(&self, experiment_id: &str) -> Option<&ExperimentRecord> {
        self.experiments.get(experiment_id)
    }

    /// Add a run to the store.
    pub fn add_run(&mut self, run: RunRecord) {
        self.runs.insert(run.run_id().to_string(), run);
    }

    /// Get a run by ID.
    #[must_use]
    pub fn get_run(&self, run_id: &str) -> Option<&RunRecord> {
        self.runs.get(run_id)
    }

    /// Get a run by ID for a status transition.
    pub fn get_run_mut(&mut self, run_id: &str) -> Option<&mut RunRecord> {
        self.runs.get_mut(run_id)
    }

    /// Get all runs for an experiment.
    #[must_use]
    pub fn get_runs_for_experiment(&self, experiment_id: &str) -> Vec<&RunRecord> {
        self.runs
            .values()
            .filter(|run| run.experiment_id() == experiment_id)
            .collect()
    }

    /// Add a param to the store.
    ///
    /// Re-logging an identical value is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the run already holds the key with a
    /// different value.
    pub fn add_param(&mut self, param: ParamRecord) -> Result<()> {
        let existing = self
            .params
            .iter()
            .find(|p| p.run_id() == param.run_id() && p.key() == param.key());

        match existing {
            Some(p) if p.value() == param.value() => Ok(()),
            Some(p) => Err(Error::Backend(format!(
                "param '{}' of run {} already logged with value {}, cannot change it to {}",
                p.key(),
                p.run_id(),
                p.value(),
                param.value()
            ))),
            None => {
                self.params.push(param);
                Ok(())
            }
        }
    }

    /// Get params for a run, in logging order.
    #[must_use]
    pub fn get_params_for_run(&self, run_id: &str) -> Vec<&ParamRecord> {
        self.params.iter().filter(|p| p.run_id() == run_id).collect()
    }

    /// Add a model to the store.
    pub fn add_model(&mut self, model: ModelRecord) {
        self.models.push(model);
    }

    /// Get models for a run, in logging order.
    #[must_use]
    pub fn get_models_for_run(&self, run_id: &str) -> Vec<&ModelRecord> {
        self.models.iter().filter(|m| m.run_id() == run_id).collect()
    }
}
