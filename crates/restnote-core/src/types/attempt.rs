//! Execution attempt record
//!
//! One ExecutionAttempt exists per cell-run. Attempts carry the execution
//! order assigned at start, wall-clock timings, and a cancellation token
//! scoped to exactly this run. Re-running a cell creates a fresh attempt;
//! completed attempts are never mutated again.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Opaque reference to the originating cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CellId(pub String);

impl CellId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CellId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CellId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Attempt state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    /// Created, not yet dispatched.
    Pending,
    /// Parse/transport stages in progress.
    Running,
    /// Terminal: a usable response was produced.
    Succeeded,
    /// Terminal: parse, transport, or normalization failure.
    Failed,
    /// Terminal: cancelled before or during the transport call.
    Cancelled,
}

impl AttemptState {
    /// Check whether the state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttemptState::Succeeded | AttemptState::Failed | AttemptState::Cancelled
        )
    }
}

/// One execution of a cell.
#[derive(Debug, Clone)]
pub struct ExecutionAttempt {
    /// Originating cell.
    pub cell_id: CellId,
    /// Runtime ID for this specific run; distinguishes re-runs of a cell.
    pub execution_id: String,
    /// Monotonic order assigned at start, unique per engine lifetime.
    pub order: u64,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end; absent while running.
    pub finished_at: Option<DateTime<Utc>>,
    state: AttemptState,
    cancel: CancellationToken,
}

impl ExecutionAttempt {
    /// Create a running attempt with a fresh execution id.
    pub fn start(cell_id: impl Into<CellId>, order: u64, cancel: CancellationToken) -> Self {
        Self {
            cell_id: cell_id.into(),
            execution_id: uuid::Uuid::new_v4().to_string(),
            order,
            started_at: Utc::now(),
            finished_at: None,
            state: AttemptState::Running,
            cancel,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Token bound to this attempt's transport call.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Transition to a terminal state, stamping the end time.
    ///
    /// The transition happens exactly once; a second call is ignored.
    pub fn finish(&mut self, state: AttemptState) {
        self.finish_at(state, Utc::now());
    }

    /// Terminal transition with an explicit end time.
    ///
    /// Used by the parse short-circuit, where the end time equals the start
    /// time because no transport call was made.
    pub fn finish_at(&mut self, state: AttemptState, at: DateTime<Utc>) {
        if self.state.is_terminal() {
            return;
        }
        debug_assert!(state.is_terminal());
        self.state = state;
        self.finished_at = Some(at);
    }

    /// Request cooperative cancellation.
    ///
    /// Silently does nothing once the attempt is terminal.
    pub fn cancel(&self) {
        if self.state.is_terminal() {
            return;
        }
        self.cancel.cancel();
    }

    /// Elapsed wall-clock time, once finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}
