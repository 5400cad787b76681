//! Core type definitions
//!
//! - request: RequestDescriptor and its parts
//! - attempt: per-run execution record with cancellation scope
//! - response: transport outcomes and the normalized response record

mod attempt;
mod request;
mod response;

pub use attempt::{AttemptState, CellId, ExecutionAttempt};
pub use request::{
    HeaderMap, Method, RedirectPolicy, RequestBody, RequestDescriptor, RequestOptions,
};
pub use response::{
    ErrorKind, NormalizedResponse, RequestMeta, ResponseError, TransportErrorKind,
    TransportFailure, TransportOutcome, TransportResponse,
};
