//! Response normalizer
//!
//! The normalizer is the stability core of the pipeline: whatever shape a
//! transport outcome arrives in, the result is a fixed, render-safe
//! record. It never panics and never returns an inconsistent record —
//! exactly one of `status` and `error` is set on the output.
//!
//! A failure that still carries a partial response with a status code is
//! normalized from the embedded response; the wrapping error is dropped.

use crate::types::{
    ErrorKind, HeaderMap, NormalizedResponse, RequestDescriptor, RequestMeta, TransportOutcome,
    TransportResponse,
};

/// Response headers kept on the normalized record. Fields absent upstream
/// are simply omitted.
pub const RESPONSE_HEADER_ALLOW_LIST: [&str; 13] = [
    "date",
    "allow",
    "expires",
    "cache-control",
    "content-type",
    "content-length",
    "p3p",
    "server",
    "x-xss-protection",
    "x-frame-options",
    "set-cookie",
    "connection",
    "transfer-encoding",
];

/// Normalize one transport outcome against the request that produced it.
///
/// Total function: extraction gaps degrade to an `ErrorKind::Normalization`
/// record instead of propagating.
pub fn normalize(outcome: TransportOutcome, request: &RequestDescriptor) -> NormalizedResponse {
    match outcome {
        TransportOutcome::Success { response } => from_response(response, request),
        TransportOutcome::Failure { error, partial } => match partial {
            // Prefer the embedded response whenever it carries a status.
            Some(partial) if partial.status.is_some() => from_response(partial, request),
            partial => {
                let meta = request_meta(request, partial.as_ref());
                NormalizedResponse::from_error(error.kind.into(), error.message, Some(meta))
            }
        },
    }
}

fn from_response(response: TransportResponse, request: &RequestDescriptor) -> NormalizedResponse {
    let meta = request_meta(request, Some(&response));
    let Some(status) = response.status else {
        return NormalizedResponse::from_error(
            ErrorKind::Normalization,
            "transport outcome carried no status code",
            Some(meta),
        );
    };

    NormalizedResponse {
        status: Some(status),
        status_text: response.status_text,
        headers: filter_headers(&response.headers),
        request: Some(meta),
        body: response.body,
        error: None,
    }
}

fn request_meta(request: &RequestDescriptor, response: Option<&TransportResponse>) -> RequestMeta {
    let final_url = response
        .and_then(|r| r.final_url.clone())
        .unwrap_or_else(|| request.url.clone());
    RequestMeta {
        method: request.method,
        http_version: response.and_then(|r| r.http_version.clone()),
        url: final_url,
    }
}

fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| {
            RESPONSE_HEADER_ALLOW_LIST
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(name))
        })
        .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
        .collect()
}
