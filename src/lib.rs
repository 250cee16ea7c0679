//! # trueno-track: Pipeline Experiment Tracking Hooks
//!
//! **Version**: 0.1.0
//!
//! trueno-track hooks into a data pipeline's lifecycle and records the run's
//! parameters and trained models to an experiment tracking backend.
//!
//! ## Lifecycle
//!
//! 1. `after_catalog_created`: the parameter mapping is loaded from the
//!    catalog, the tracking configuration under the reserved `trueno_track`
//!    key is resolved into a [`LoggingPolicy`](config::LoggingPolicy), and
//!    the selected parameters are logged.
//! 2. `after_node_run`: every node output declared under `models` is logged
//!    as a model, with an input example and signature when the model spec
//!    names an input.
//!
//! All records of one pipeline run land in the same tracking run.
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use trueno_track::catalog::MemoryCatalog;
//! use trueno_track::data::{Dataset, NodeData, NodeValue};
//! use trueno_track::hooks::{EventLogger, PipelineHooks};
//! use trueno_track::model::Predictable;
//! use trueno_track::tracking::InMemoryBackend;
//!
//! struct Doubler;
//!
//! impl Predictable for Doubler {
//!     fn predict(&self, input: &Dataset) -> trueno_track::Result<Dataset> {
//!         let batch = input.to_json()?;
//!         let doubled: Vec<f64> = batch
//!             .as_array()
//!             .into_iter()
//!             .flatten()
//!             .filter_map(|x| x.as_f64())
//!             .map(|x| x * 2.0)
//!             .collect();
//!         Ok(Dataset::Json(json!(doubled)))
//!     }
//! }
//!
//! let catalog = MemoryCatalog::new().with_entry(
//!     "parameters",
//!     json!({
//!         "scale": 2,
//!         "trueno_track": {"models": {"doubler": {"input": "x"}}}
//!     }),
//! );
//!
//! let mut logger = EventLogger::new(InMemoryBackend::new("doubling"));
//! logger.after_catalog_created(&catalog)?;
//!
//! let inputs = NodeData::from([("x".to_string(), NodeValue::json(json!([1.5, 3.0])))]);
//! let outputs = NodeData::from([("doubler".to_string(), NodeValue::model(Doubler))]);
//! logger.after_node_run(&inputs, &outputs)?;
//!
//! let run_id = logger.state().run_id().unwrap().to_string();
//! let models = logger.backend().store().get_models_for_run(&run_id);
//! assert_eq!(models[0].input_example(), Some(&json!([1.5])));
//! # Ok::<(), trueno_track::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod experiment;
pub mod hooks;
pub mod model;
pub mod tracking;

pub use error::{Error, Result};
