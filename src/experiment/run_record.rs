//! Run Record - one tracking record grouping params and models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is created but not yet started.
    Pending,
    /// Run is open and accepting params and models.
    Running,
    /// Last scope on the run closed successfully.
    Success,
    /// Last scope on the run closed with an error.
    Failed,
}

impl RunStatus {
    /// Whether the run is closed (not accepting records).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Run Record represents a single tracked pipeline run.
///
/// A run can be closed and resumed any number of times: the tracking logger
/// opens a scope per logging call and reuses the same run ID for all of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    run_id: String,
    experiment_id: String,
    status: RunStatus,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    scopes: u32,
}

impl RunRecord {
    /// Create a new run record in Pending status.
    ///
    /// # Arguments
    ///
    /// * `run_id` - Unique identifier for the run
    /// * `experiment_id` - ID of the parent experiment
    #[must_use]
    pub fn new(run_id: impl Into<String>, experiment_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            experiment_id: experiment_id.into(),
            status: RunStatus::Pending,
            started_at: None,
            ended_at: None,
            scopes: 0,
        }
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the parent experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the timestamp of the first start.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the timestamp of the last completion, if the run is closed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Number of times the run has been opened.
    #[must_use]
    pub const fn scopes(&self) -> u32 {
        self.scopes
    }

    /// Open the run, from Pending or from a closed state.
    ///
    /// `started_at` keeps the first start; `ended_at` is cleared.
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at.get_or_insert_with(Utc::now);
        self.ended_at = None;
        self.scopes += 1;
    }

    /// Close the run with the given final status.
    ///
    /// Sets the `ended_at` timestamp to now.
    pub fn complete(&mut self, status: RunStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }
}
