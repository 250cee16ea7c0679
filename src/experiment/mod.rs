//! Experiment Tracking Schema
//!
//! Records written by the in-memory tracking backend.
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentRecord (1) ──< RunRecord (N)
//!                              │
//!                              ├──< ParamRecord (N) [write-once per key]
//!                              └──< ModelRecord (N) [signature + example]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use trueno_track::experiment::{
//!     ExperimentRecord, ExperimentStore, ParamRecord, RunRecord, RunStatus,
//! };
//!
//! let mut store = ExperimentStore::new();
//! let experiment = ExperimentRecord::new("exp-0001", "house-prices");
//!
//! let mut run = RunRecord::new("run-0001", experiment.experiment_id());
//! run.start();
//! store.add_param(ParamRecord::new(run.run_id(), "alpha", json!(0.5)))?;
//! run.complete(RunStatus::Success);
//!
//! store.add_experiment(experiment);
//! store.add_run(run);
//! assert_eq!(store.get_params_for_run("run-0001").len(), 1);
//! # Ok::<(), trueno_track::Error>(())
//! ```

mod experiment_record;
mod model_record;
mod param_record;
mod run_record;
mod store;

pub use experiment_record::ExperimentRecord;
pub use model_record::ModelRecord;
pub use param_record::ParamRecord;
pub use run_record::{RunRecord, RunStatus};
pub use store::ExperimentStore;
