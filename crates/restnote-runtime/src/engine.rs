//! Cell execution engine
//!
//! The Engine runs one attempt per call: parse the cell text, issue the
//! request over the transport with the attempt's cancellation token bound
//! before dispatch, normalize the outcome, render the output, and record
//! the response through the cache hook.
//!
//! The engine holds no per-attempt locks and never serializes attempts;
//! re-running a cell while a prior attempt is in flight creates an
//! independent attempt with a fresh order value. Exclusivity per cell is
//! the caller's responsibility.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use restnote_core::normalizer::normalize;
use restnote_core::parser::parse;
use restnote_core::renderer::{render, RenderedOutput};
use restnote_core::types::{
    AttemptState, CellId, ErrorKind, ExecutionAttempt, NormalizedResponse, RequestDescriptor,
    RequestOptions, TransportFailure, TransportOutcome,
};
use restnote_core::CancellationToken;

use crate::cache::ResponseCacheWriter;
use crate::transport::Transport;

/// Completed result of one cell attempt, handed back to the surface.
#[derive(Debug, Clone)]
pub struct CellRun {
    /// Attempt record with order, timings, and terminal state.
    pub attempt: ExecutionAttempt,
    /// Canonical response record.
    pub response: NormalizedResponse,
    /// All rendered representations of the response.
    pub output: RenderedOutput,
}

/// The execution engine - orchestrates the per-cell pipeline.
pub struct Engine {
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn ResponseCacheWriter>>,
    /// Transport options applied to every parsed request.
    options: RequestOptions,
    /// Shared execution-order counter; values are never reused.
    order: AtomicU64,
}

impl Engine {
    /// Create an engine over a transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: None,
            options: RequestOptions::default(),
            order: AtomicU64::new(0),
        }
    }

    /// Attach the external response cache write hook.
    pub fn with_cache_writer(mut self, cache: Arc<dyn ResponseCacheWriter>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set transport options (timeout, redirect policy) for parsed
    /// requests. Unset values mean "transport default".
    pub fn with_request_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Execute one cell's text as an independent attempt.
    pub async fn execute(
        &self,
        cell_id: impl Into<CellId>,
        text: &str,
        cancel: CancellationToken,
    ) -> CellRun {
        let order = self.order.fetch_add(1, Ordering::SeqCst) + 1;
        let mut attempt = ExecutionAttempt::start(cell_id, order, cancel.clone());
        tracing::info!(
            cell_id = %attempt.cell_id,
            order,
            execution_id = %attempt.execution_id,
            "cell execution started"
        );

        let request = match parse(text) {
            Ok(request) => request.with_options(self.options.clone()),
            Err(error) => {
                // Parse short-circuit: no transport call, no cache write,
                // end time equals start time.
                tracing::warn!(
                    cell_id = %attempt.cell_id,
                    order,
                    error = %error,
                    "request text failed to parse"
                );
                let response =
                    NormalizedResponse::from_error(ErrorKind::Parse, error.to_string(), None);
                attempt.finish_at(AttemptState::Failed, attempt.started_at);
                let output = render(&response);
                return CellRun {
                    attempt,
                    response,
                    output,
                };
            }
        };

        // Bind point: a token already cancelled here must keep the
        // transport call from being issued at all.
        let response = if cancel.is_cancelled() {
            normalize(
                TransportOutcome::failure(TransportFailure::cancelled(
                    "cancelled before dispatch",
                )),
                &request,
            )
        } else {
            let outcome = self.transport.send(&request, &cancel).await;
            let response = normalize(outcome, &request);
            // The transport stage produced an outcome; the cache write is
            // not subject to cancellation.
            self.record_response(&request, &response).await;
            response
        };

        let state = terminal_state(&response);
        attempt.finish(state);
        tracing::info!(
            cell_id = %attempt.cell_id,
            order,
            state = ?state,
            duration_ms = attempt.duration().map(|d| d.num_milliseconds()),
            "cell execution finished"
        );

        let output = render(&response);
        CellRun {
            attempt,
            response,
            output,
        }
    }

    async fn record_response(&self, request: &RequestDescriptor, response: &NormalizedResponse) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(error) = cache.record(request, response).await {
            tracing::warn!(error = %error, "failed to record response in cache");
        }
    }
}

fn terminal_state(response: &NormalizedResponse) -> AttemptState {
    match response.error_kind() {
        None => AttemptState::Succeeded,
        Some(ErrorKind::Cancelled) => AttemptState::Cancelled,
        Some(_) => AttemptState::Failed,
    }
}
