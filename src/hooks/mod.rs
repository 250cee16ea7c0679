//! Pipeline lifecycle hooks
//!
//! The pipeline executor calls [`PipelineHooks::after_catalog_created`] once
//! before any node runs, then [`PipelineHooks::after_node_run`] once per
//! completed node, serially. Errors abort the pipeline: a configuration
//! error aborts startup, a tracking error aborts the node whose output
//! triggered logging (its computation has already completed).

mod logger;

pub use logger::{EventLogger, EventLoggerBuilder, LoggerState};

use crate::catalog::Catalog;
use crate::data::NodeData;
use crate::Result;

/// Listener for pipeline lifecycle events.
pub trait PipelineHooks {
    /// Called once the run's catalog is created.
    ///
    /// # Errors
    ///
    /// Returns error if the hook cannot initialize; the pipeline must not run.
    fn after_catalog_created(&mut self, catalog: &dyn Catalog) -> Result<()>;

    /// Called after a node ran, with its materialized inputs and outputs.
    ///
    /// # Errors
    ///
    /// Returns error if post-processing of the node fails.
    fn after_node_run(&mut self, inputs: &NodeData, outputs: &NodeData) -> Result<()>;
}
