//! Transport outcome and normalized response shapes
//!
//! TransportOutcome is the raw, shape-varying result a transport hands
//! back; NormalizedResponse is the fixed, render-safe record derived from
//! it. A failure may still carry a partial response (e.g. a status line
//! received before the connection dropped), which is modeled explicitly
//! rather than probed for.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::request::{HeaderMap, Method};

/// Raw response fields as received from a transport, unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportResponse {
    /// Status code; a transport that lost the status line leaves it unset.
    pub status: Option<u16>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub headers: HeaderMap,
    /// Protocol version, e.g. "HTTP/1.1".
    #[serde(default)]
    pub http_version: Option<String>,
    /// Final URL after redirects.
    #[serde(default)]
    pub final_url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Failure classes a transport can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// Connection, DNS, TLS, or protocol failure.
    Network,
    /// The configured timeout expired.
    Timeout,
    /// The attempt's cancellation token fired.
    Cancelled,
}

/// A transport-level failure with an optional partial response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFailure {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportFailure {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Cancelled, message)
    }
}

/// Tagged result of one transport call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportOutcome {
    /// The call produced a response.
    Success { response: TransportResponse },
    /// The call failed; a partial response may still be attached.
    Failure {
        error: TransportFailure,
        #[serde(default)]
        partial: Option<TransportResponse>,
    },
}

impl TransportOutcome {
    pub fn success(response: TransportResponse) -> Self {
        Self::Success { response }
    }

    pub fn failure(error: TransportFailure) -> Self {
        Self::Failure {
            error,
            partial: None,
        }
    }

    pub fn failure_with_partial(error: TransportFailure, partial: TransportResponse) -> Self {
        Self::Failure {
            error,
            partial: Some(partial),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Failure vocabulary exposed to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed request text; the transport was never called.
    Parse,
    /// Network-level transport failure.
    Transport,
    /// Transport timeout expiry.
    Timeout,
    /// Cancelled before or during the transport call.
    Cancelled,
    /// The normalizer could not extract the expected fields.
    Normalization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Transport => "transport",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Normalization => "normalization",
        };
        f.write_str(label)
    }
}

impl From<TransportErrorKind> for ErrorKind {
    fn from(kind: TransportErrorKind) -> Self {
        match kind {
            TransportErrorKind::Network => ErrorKind::Transport,
            TransportErrorKind::Timeout => ErrorKind::Timeout,
            TransportErrorKind::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Error detail on a response that carries no usable status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ResponseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Minimal echo of the request carried on every normalized response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_version: Option<String>,
    /// Final resolved URL after redirects.
    pub url: String,
}

/// Canonical, render-safe response record for one terminal attempt.
///
/// Exactly one of `status` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(default, skip_serializing_if = "HeaderMap::is_empty")]
    pub headers: HeaderMap,
    /// Absent only for parse failures, which never built a request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl NormalizedResponse {
    /// Build an error-bearing record.
    pub fn from_error(
        kind: ErrorKind,
        message: impl Into<String>,
        request: Option<RequestMeta>,
    ) -> Self {
        Self {
            status: None,
            status_text: None,
            headers: HeaderMap::new(),
            request,
            body: None,
            error: Some(ResponseError::new(kind, message)),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
