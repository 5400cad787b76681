//! Transport SPI and the bundled reqwest transport
//!
//! Transports are black boxes to the Engine: they receive a fully
//! validated RequestDescriptor plus the attempt's cancellation token and
//! return a tagged TransportOutcome. The token must be observed both at
//! the dispatch point and while the call is in flight.

use async_trait::async_trait;

use restnote_core::types::{
    Method, RedirectPolicy, RequestDescriptor, RequestOptions, TransportFailure, TransportOutcome,
    TransportResponse,
};
use restnote_core::{CancellationToken, HeaderMap};

use crate::config::TransportConfig;

/// Transport trait - the seam between the engine and the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request, racing it against the cancellation token.
    async fn send(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> TransportOutcome;
}

/// HTTP transport backed by a shared reqwest client.
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Create a transport with default settings.
    pub fn new() -> Self {
        Self::from_config(&TransportConfig::default())
    }

    /// Create a transport from runtime configuration.
    pub fn from_config(config: &TransportConfig) -> Self {
        let client =
            build_client(config, None).unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Client honoring a per-request redirect override.
    ///
    /// reqwest fixes the redirect policy at client construction, so a
    /// request that overrides it gets a dedicated client.
    fn client_for(&self, options: &RequestOptions) -> Result<reqwest::Client, reqwest::Error> {
        match options.redirect {
            None => Ok(self.client.clone()),
            Some(policy) => build_client(&self.config, Some(policy)),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> TransportOutcome {
        if cancel.is_cancelled() {
            return TransportOutcome::failure(TransportFailure::cancelled(
                "cancelled before dispatch",
            ));
        }

        let client = match self.client_for(&request.options) {
            Ok(client) => client,
            Err(error) => {
                return TransportOutcome::failure(TransportFailure::network(format!(
                    "failed to build HTTP client: {error}"
                )))
            }
        };

        let mut builder = client.request(reqwest_method(request.method), &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.text.clone());
        }
        if let Some(timeout) = request.options.timeout {
            builder = builder.timeout(timeout);
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return TransportOutcome::failure(TransportFailure::cancelled(
                    "cancelled in flight",
                ));
            }
            result = builder.send() => match result {
                Ok(response) => response,
                Err(error) => return TransportOutcome::failure(map_reqwest_error(&error)),
            },
        };

        let status = response.status();
        let mut received = TransportResponse {
            status: Some(status.as_u16()),
            status_text: status.canonical_reason().map(|reason| reason.to_string()),
            headers: response_headers(response.headers()),
            http_version: Some(format!("{:?}", response.version())),
            final_url: Some(response.url().to_string()),
            body: None,
        };

        let body = tokio::select! {
            _ = cancel.cancelled() => {
                return TransportOutcome::failure_with_partial(
                    TransportFailure::cancelled("cancelled while reading body"),
                    received,
                );
            }
            result = response.text() => result,
        };

        match body {
            Ok(text) => {
                received.body = Some(text);
                TransportOutcome::success(received)
            }
            Err(error) => {
                TransportOutcome::failure_with_partial(map_reqwest_error(&error), received)
            }
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn response_headers(headers: &reqwest::header::HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn map_reqwest_error(error: &reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::timeout(error.to_string())
    } else {
        TransportFailure::network(error.to_string())
    }
}

fn build_client(
    config: &TransportConfig,
    redirect_override: Option<RedirectPolicy>,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(agent) = &config.user_agent {
        builder = builder.user_agent(agent.clone());
    }

    let policy = match redirect_override {
        Some(RedirectPolicy::Follow) => reqwest::redirect::Policy::default(),
        Some(RedirectPolicy::Limited(hops)) => reqwest::redirect::Policy::limited(hops),
        Some(RedirectPolicy::None) => reqwest::redirect::Policy::none(),
        None if config.follow_redirects => {
            reqwest::redirect::Policy::limited(config.max_redirects)
        }
        None => reqwest::redirect::Policy::none(),
    };

    builder.redirect(policy).build()
}
