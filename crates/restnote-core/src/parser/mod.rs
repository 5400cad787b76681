//! Request cell parser
//!
//! Turns one cell's raw text into a RequestDescriptor:
//! - first non-blank line: `[METHOD] URL` (method defaults to GET),
//! - `Name: Value` lines up to the first blank line are headers,
//! - everything after the blank line is the body, verbatim.
//!
//! Purely functional: no I/O, no shared state, safe to call concurrently
//! for independent cells. All failure is encoded in the returned error;
//! a descriptor is only constructed once the URL and method check out.

use thiserror::Error;
use url::Url;

use crate::types::{HeaderMap, Method, RequestBody, RequestDescriptor, RequestOptions};

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Parse failures for request cell text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("request text is empty")]
    Empty,

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("request line has too many tokens: {0}")]
    MalformedRequestLine(String),

    #[error("not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("malformed header line: {0}")]
    MalformedHeader(String),
}

/// Parse one cell's text into a request descriptor.
pub fn parse(text: &str) -> Result<RequestDescriptor, ParseError> {
    let mut rest = text;

    // Skip leading blank lines.
    let request_line = loop {
        if rest.is_empty() {
            return Err(ParseError::Empty);
        }
        let (line, tail) = next_line(rest);
        rest = tail;
        if !line.trim().is_empty() {
            break line.trim();
        }
    };

    let (method, url) = parse_request_line(request_line)?;
    validate_url(&url)?;

    let mut headers = HeaderMap::new();
    loop {
        if rest.is_empty() {
            break;
        }
        let (line, tail) = next_line(rest);
        if line.trim().is_empty() {
            // Blank separator: the untouched remainder is the body.
            rest = tail;
            break;
        }
        parse_header_line(&mut headers, line)?;
        rest = tail;
    }

    let body = if rest.trim().is_empty() {
        None
    } else {
        Some(RequestBody {
            text: rest.to_string(),
            content_type: headers.get("Content-Type").map(|v| v.to_string()),
        })
    };

    Ok(RequestDescriptor {
        method,
        url,
        headers,
        body,
        options: RequestOptions::default(),
    })
}

/// Split off the first line, consuming the newline. Keeps the tail verbatim.
fn next_line(input: &str) -> (&str, &str) {
    match input.find('\n') {
        Some(idx) => {
            let line = input[..idx].strip_suffix('\r').unwrap_or(&input[..idx]);
            (line, &input[idx + 1..])
        }
        None => (input, ""),
    }
}

fn parse_request_line(line: &str) -> Result<(Method, String), ParseError> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next().ok_or(ParseError::Empty)?;

    let (method, url) = match tokens.next() {
        None => (Method::Get, first),
        Some(url) => {
            let method = Method::from_token(first)
                .ok_or_else(|| ParseError::UnsupportedMethod(first.to_string()))?;
            (method, url)
        }
    };

    if tokens.next().is_some() {
        return Err(ParseError::MalformedRequestLine(line.to_string()));
    }

    Ok((method, url.to_string()))
}

fn validate_url(raw: &str) -> Result<(), ParseError> {
    let parsed = Url::parse(raw).map_err(|_| ParseError::InvalidUrl(raw.to_string()))?;
    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ParseError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    Ok(())
}

fn parse_header_line(headers: &mut HeaderMap, line: &str) -> Result<(), ParseError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::MalformedHeader(line.to_string()));
    }
    headers.insert(name, value.trim());
    Ok(())
}
