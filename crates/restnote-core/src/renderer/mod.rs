//! Multi-format response renderer
//!
//! Derives independent representations of one NormalizedResponse, keyed
//! by MIME tag:
//! - structured (`application/json`): the full record as inspectable JSON,
//! - markup (`text/html`): a human-oriented passive rendering,
//! - rich (`x-application/restnote`): same payload as structured, for
//!   surfaces that route rich output through a dedicated channel.
//!
//! Rendering is pure and total: unrenderable fields degrade to their raw
//! form, and re-rendering the same response produces byte-identical
//! output per tag. Error-bearing responses additionally carry an error
//! item in the notebook error-output shape.

use serde_json::{json, Map, Value};

use crate::types::NormalizedResponse;

/// Rich output channel tag.
pub const MIME_RICH: &str = "x-application/restnote";
/// Structured output tag.
pub const MIME_STRUCTURED: &str = "application/json";
/// Human-oriented markup tag.
pub const MIME_MARKUP: &str = "text/html";
/// Cell-level error output tag.
pub const MIME_ERROR: &str = "application/x.notebook.error-traceback";

/// One representation of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputItem {
    pub mime: String,
    pub value: Value,
}

/// The full set of representations derived from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutput {
    pub items: Vec<OutputItem>,
}

impl RenderedOutput {
    /// Look up the representation for a MIME tag.
    pub fn get(&self, mime: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|item| item.mime == mime)
            .map(|item| &item.value)
    }
}

/// Render every output representation for one normalized response.
pub fn render(response: &NormalizedResponse) -> RenderedOutput {
    let structured = structured_value(response);
    let mut items = vec![
        OutputItem {
            mime: MIME_RICH.to_string(),
            value: structured.clone(),
        },
        OutputItem {
            mime: MIME_STRUCTURED.to_string(),
            value: structured,
        },
        OutputItem {
            mime: MIME_MARKUP.to_string(),
            value: Value::String(markup_value(response)),
        },
    ];

    if let Some(error) = &response.error {
        items.push(OutputItem {
            mime: MIME_ERROR.to_string(),
            value: json!({
                "ename": error.kind.to_string(),
                "evalue": error.message,
                "traceback": [],
            }),
        });
    }

    RenderedOutput { items }
}

fn structured_value(response: &NormalizedResponse) -> Value {
    let mut root = Map::new();

    if let Some(status) = response.status {
        root.insert("status".to_string(), json!(status));
    }
    if let Some(status_text) = &response.status_text {
        root.insert("status_text".to_string(), json!(status_text));
    }
    if !response.headers.is_empty() {
        let headers: Map<String, Value> = response
            .headers
            .iter()
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect();
        root.insert("headers".to_string(), Value::Object(headers));
    }
    if let Some(meta) = &response.request {
        let mut request = Map::new();
        request.insert("method".to_string(), json!(meta.method.as_str()));
        if let Some(version) = &meta.http_version {
            request.insert("http_version".to_string(), json!(version));
        }
        request.insert("url".to_string(), json!(meta.url));
        root.insert("request".to_string(), Value::Object(request));
    }
    if let Some(body) = &response.body {
        root.insert("body".to_string(), json!(body));
    }
    if let Some(error) = &response.error {
        root.insert(
            "error".to_string(),
            json!({
                "kind": error.kind.to_string(),
                "message": error.message,
            }),
        );
    }

    Value::Object(root)
}

fn markup_value(response: &NormalizedResponse) -> String {
    if let Some(error) = &response.error {
        return format!(
            "<div class=\"response-error\"><strong>{}</strong>: {}</div>",
            escape_html(&error.kind.to_string()),
            escape_html(&error.message)
        );
    }

    let mut html = String::from("<div class=\"response\">");

    let status = response
        .status
        .map(|s| s.to_string())
        .unwrap_or_default();
    let status_text = response.status_text.as_deref().unwrap_or("");
    html.push_str(&format!(
        "<p class=\"status-line\">{} {}</p>",
        escape_html(&status),
        escape_html(status_text)
    ));

    if let Some(meta) = &response.request {
        html.push_str(&format!(
            "<p class=\"request-line\">{} {}</p>",
            escape_html(meta.method.as_str()),
            escape_html(&meta.url)
        ));
    }

    if !response.headers.is_empty() {
        html.push_str("<table class=\"headers\">");
        for (name, value) in response.headers.iter() {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(name),
                escape_html(value)
            ));
        }
        html.push_str("</table>");
    }

    if let Some(body) = &response.body {
        html.push_str(&format!("<pre>{}</pre>", escape_html(body)));
    }

    html.push_str("</div>");
    html
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use crate::parser::parse;
    use crate::types::{
        HeaderMap, NormalizedResponse, TransportFailure, TransportOutcome, TransportResponse,
    };

    fn normalized_ok() -> NormalizedResponse {
        let request = parse("GET https://example.com/a").expect("request");
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "text/plain");
        normalize(
            TransportOutcome::success(TransportResponse {
                status: Some(404),
                status_text: Some("Not Found".to_string()),
                headers,
                http_version: Some("HTTP/1.1".to_string()),
                final_url: Some("https://example.com/a".to_string()),
                body: Some("missing".to_string()),
            }),
            &request,
        )
    }

    #[test]
    fn test_all_three_tags_are_present() {
        let output = render(&normalized_ok());
        assert!(output.get(MIME_RICH).is_some());
        assert!(output.get(MIME_STRUCTURED).is_some());
        assert!(output.get(MIME_MARKUP).is_some());
        assert!(output.get(MIME_ERROR).is_none());
    }

    #[test]
    fn test_structured_tag_contains_status() {
        let output = render(&normalized_ok());
        let structured = output.get(MIME_STRUCTURED).expect("structured");
        assert_eq!(structured["status"], json!(404));
        assert_eq!(structured["body"], json!("missing"));
        assert_eq!(structured["request"]["method"], json!("GET"));
    }

    #[test]
    fn test_rich_tag_is_identical_to_structured_tag() {
        let output = render(&normalized_ok());
        assert_eq!(output.get(MIME_RICH), output.get(MIME_STRUCTURED));
    }

    #[test]
    fn test_rendering_is_deterministic_per_tag() {
        let response = normalized_ok();
        let first = render(&response);
        let second = render(&response);

        for item in &first.items {
            let again = second.get(&item.mime).expect("tag present");
            assert_eq!(
                serde_json::to_string(&item.value).unwrap(),
                serde_json::to_string(again).unwrap(),
                "tag {} must render byte-identically",
                item.mime
            );
        }
    }

    #[test]
    fn test_error_response_renders_error_item() {
        let request = parse("GET https://example.com/a").expect("request");
        let response = normalize(
            TransportOutcome::failure(TransportFailure::cancelled("stopped")),
            &request,
        );
        let output = render(&response);

        let error = output.get(MIME_ERROR).expect("error item");
        assert_eq!(error["ename"], json!("cancelled"));
        assert_eq!(error["evalue"], json!("stopped"));

        let structured = output.get(MIME_STRUCTURED).expect("structured");
        assert_eq!(structured["error"]["kind"], json!("cancelled"));
        assert!(structured.get("status").is_none());
    }

    #[test]
    fn test_markup_escapes_body_content() {
        let request = parse("GET https://example.com/a").expect("request");
        let response = normalize(
            TransportOutcome::success(TransportResponse {
                status: Some(200),
                body: Some("<script>alert(1)</script>".to_string()),
                ..TransportResponse::default()
            }),
            &request,
        );
        let output = render(&response);
        let markup = output
            .get(MIME_MARKUP)
            .and_then(|v| v.as_str())
            .expect("markup");
        assert!(markup.contains("&lt;script&gt;"));
        assert!(!markup.contains("<script>"));
    }
}
