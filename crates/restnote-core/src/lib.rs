//! # Restnote Core
//!
//! Pure pipeline stages for restnote's request cells.
//!
//! This crate contains:
//! - RequestDescriptor / ExecutionAttempt / NormalizedResponse definitions
//! - the textual request parser
//! - the response normalizer and the multi-format renderer
//!
//! This crate does NOT care about:
//! - How requests are sent over the network
//! - Who stores or displays rendered output
//! - Which runtime schedules cell attempts

pub mod normalizer;
pub mod parser;
pub mod renderer;
pub mod types;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::normalizer::{normalize, RESPONSE_HEADER_ALLOW_LIST};
    pub use crate::parser::{parse, ParseError};
    pub use crate::renderer::{
        render, OutputItem, RenderedOutput, MIME_ERROR, MIME_MARKUP, MIME_RICH, MIME_STRUCTURED,
    };
    pub use crate::types::{
        AttemptState, CellId, ErrorKind, ExecutionAttempt, HeaderMap, Method, NormalizedResponse,
        RedirectPolicy, RequestBody, RequestDescriptor, RequestMeta, RequestOptions, ResponseError,
        TransportErrorKind, TransportFailure, TransportOutcome, TransportResponse,
    };
    pub use crate::CancellationToken;
}

// Re-export CancellationToken so downstream crates share one cancellation type.
pub use tokio_util::sync::CancellationToken;

// Re-export key types at crate root
pub use normalizer::normalize;
pub use parser::{parse, ParseError};
pub use renderer::{render, OutputItem, RenderedOutput};
pub use types::{
    AttemptState, CellId, ErrorKind, ExecutionAttempt, HeaderMap, Method, NormalizedResponse,
    RequestDescriptor, TransportOutcome, TransportResponse,
};
