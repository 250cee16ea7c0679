//! Tracking backend abstraction
//!
//! A backend records params and models under runs. Every logging call made
//! by the hook logger happens inside a [`RunScope`], which starts (or
//! resumes) a run on entry and ends it on every exit path: success, error,
//! or unwinding panic.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use trueno_track::tracking::{with_run, InMemoryBackend, TrackingBackend};
//!
//! let mut backend = InMemoryBackend::new("house-prices");
//! let params = json!({"alpha": 0.5}).as_object().cloned().unwrap();
//!
//! let run_id = with_run(&mut backend, None, |run, backend| {
//!     backend.log_params(&params)?;
//!     Ok(run.run_id.clone())
//! })?;
//! assert_eq!(backend.store().get_params_for_run(&run_id).len(), 1);
//! assert!(backend.active_run().is_none());
//! # Ok::<(), trueno_track::Error>(())
//! ```

mod memory;

pub use memory::InMemoryBackend;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::data::Dataset;
use crate::experiment::RunStatus;
use crate::model::{ModelSignature, Predictable};
use crate::Result;

/// Identifies the run opened by [`TrackingBackend::start_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    /// Run ID, stable across resumes
    pub run_id: String,
    /// Experiment the run belongs to
    pub experiment_id: String,
}

/// Experiment tracking backend.
///
/// Calls are blocking; retries and connectivity belong to the implementation.
pub trait TrackingBackend {
    /// Start a new run, or resume `run_id` when given.
    ///
    /// # Errors
    ///
    /// Returns error if the run cannot be started or does not exist.
    fn start_run(&mut self, run_id: Option<&str>) -> Result<RunHandle>;

    /// End the active run with a final status.
    ///
    /// # Errors
    ///
    /// Returns error if no run is active.
    fn end_run(&mut self, status: RunStatus) -> Result<()>;

    /// Log parameters to the active run.
    ///
    /// # Errors
    ///
    /// Returns error if no run is active or the backend rejects a value.
    fn log_params(&mut self, params: &Map<String, Value>) -> Result<()>;

    /// Log a model to the active run.
    ///
    /// # Errors
    ///
    /// Returns error if no run is active or the model cannot be stored.
    fn log_model(
        &mut self,
        model: &dyn Predictable,
        name: &str,
        signature: Option<&ModelSignature>,
        input_example: Option<&Dataset>,
    ) -> Result<()>;
}

/// An open run, ended when closed or dropped.
///
/// Dropping an open scope (early return, panic) ends the run as
/// [`RunStatus::Failed`].
pub struct RunScope<'a, B: TrackingBackend + ?Sized> {
    backend: &'a mut B,
    handle: RunHandle,
    open: bool,
}

impl<'a, B: TrackingBackend + ?Sized> RunScope<'a, B> {
    /// Start or resume a run.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot start the run.
    pub fn open(backend: &'a mut B, run_id: Option<&str>) -> Result<Self> {
        let handle = backend.start_run(run_id)?;
        debug!(run_id = %handle.run_id, "Run scope opened");
        Ok(Self {
            backend,
            handle,
            open: true,
        })
    }

    /// Handle of the open run.
    #[must_use]
    pub const fn handle(&self) -> &RunHandle {
        &self.handle
    }

    /// Backend to log through while the run is open.
    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    /// End the run with `status`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails to end the run.
    pub fn close(mut self, status: RunStatus) -> Result<()> {
        self.open = false;
        debug!(run_id = %self.handle.run_id, ?status, "Run scope closed");
        self.backend.end_run(status)
    }
}

impl<B: TrackingBackend + ?Sized> Drop for RunScope<'_, B> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.backend.end_run(RunStatus::Failed) {
                warn!(run_id = %self.handle.run_id, error = %e, "Failed to end run");
            }
        }
    }
}

/// Run `f` inside a run scope.
///
/// `f` receives the handle of the open run and the backend to log through.
/// The run ends as [`RunStatus::Success`] when `f` succeeds and as
/// [`RunStatus::Failed`] when it fails. The error of `f` wins over an error
/// ending the run.
///
/// # Errors
///
/// Returns error if the run cannot be started, if `f` fails, or if the run
/// cannot be ended after `f` succeeded.
pub fn with_run<B, T, F>(backend: &mut B, run_id: Option<&str>, f: F) -> Result<T>
where
    B: TrackingBackend + ?Sized,
    F: FnOnce(&RunHandle, &mut B) -> Result<T>,
{
    let mut scope = RunScope::open(backend, run_id)?;
    let handle = scope.handle().clone();

    match f(&handle, scope.backend()) {
        Ok(value) => {
            scope.close(RunStatus::Success)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(end) = scope.close(RunStatus::Failed) {
                warn!(run_id = %handle.run_id, error = %end, "Failed to end run after error");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_dropped_scope_fails_run() {
        let mut backend = InMemoryBackend::new("exp");
        let run_id = {
            let scope = RunScope::open(&mut backend, None).unwrap();
            scope.handle().run_id.clone()
        };

        assert!(backend.active_run().is_none());
        let run = backend.store().get_run(&run_id).unwrap();
        assert_eq!(run.status(), RunStatus::Failed);
    }

    #[test]
    fn test_with_run_ends_failed_on_error() {
        let mut backend = InMemoryBackend::new("exp");
        let result: Result<()> = with_run(&mut backend, None, |_, _| {
            Err(Error::Backend("unavailable".to_string()))
        });

        assert!(matches!(result, Err(Error::Backend(_))));
        assert!(backend.active_run().is_none());
        let run = backend.store().get_run("run-0001").unwrap();
        assert_eq!(run.status(), RunStatus::Failed);
    }

    #[test]
    fn test_with_run_resumes_given_run() {
        let mut backend = InMemoryBackend::new("exp");
        let first = with_run(&mut backend, None, |run, _| Ok(run.run_id.clone())).unwrap();
        let second =
            with_run(&mut backend, Some(first.as_str()), |run, _| Ok(run.run_id.clone())).unwrap();

        assert_eq!(first, second);
        let run = backend.store().get_run(&first).unwrap();
        assert_eq!(run.status(), RunStatus::Success);
        assert_eq!(run.scopes(), 2);
    }
}
