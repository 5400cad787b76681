//! Persisted document format
//!
//! A saved document is an ordered JSON array of cell records, each
//! carrying the cell's text and the rendered outputs produced by the
//! renderer. The document-storage collaborator owns reading and writing
//! files; these types define the shape it exchanges.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use restnote_core::renderer::RenderedOutput;

/// Cell flavor within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Prose cell, not executable.
    Markup,
    /// Executable request cell.
    Code,
}

/// One rendered output pair, as produced by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub mime: String,
    pub value: Value,
}

/// One cell in a saved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub kind: CellKind,
    pub language: String,
    pub value: String,
    #[serde(default)]
    pub outputs: Vec<OutputRecord>,
}

impl CellRecord {
    /// Create an executable request cell.
    pub fn code(language: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Code,
            language: language.into(),
            value: value.into(),
            outputs: Vec::new(),
        }
    }

    /// Create a prose cell.
    pub fn markup(value: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Markup,
            language: "markdown".to_string(),
            value: value.into(),
            outputs: Vec::new(),
        }
    }

    /// Attach rendered outputs.
    pub fn with_outputs(mut self, outputs: Vec<OutputRecord>) -> Self {
        self.outputs = outputs;
        self
    }
}

/// Convert a rendered output set into persistable records.
pub fn output_records(output: &RenderedOutput) -> Vec<OutputRecord> {
    output
        .items
        .iter()
        .map(|item| OutputRecord {
            mime: item.mime.clone(),
            value: item.value.clone(),
        })
        .collect()
}

/// Decode a saved document.
///
/// Tolerant by design: undecodable input yields an empty document rather
/// than an error, so a corrupt file still opens.
pub fn cells_from_slice(bytes: &[u8]) -> Vec<CellRecord> {
    serde_json::from_slice(bytes).unwrap_or_default()
}

/// Encode a document as pretty-printed JSON.
pub fn cells_to_vec(cells: &[CellRecord]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use restnote_core::normalizer::normalize;
    use restnote_core::parser::parse;
    use restnote_core::renderer::{render, MIME_STRUCTURED};
    use restnote_core::types::{TransportOutcome, TransportResponse};

    #[test]
    fn test_document_round_trip_preserves_cells() {
        let cells = vec![
            CellRecord::markup("# Requests"),
            CellRecord::code("restnote", "GET https://example.com/a"),
        ];

        let bytes = cells_to_vec(&cells).expect("encode");
        let decoded = cells_from_slice(&bytes);
        assert_eq!(decoded, cells);
    }

    #[test]
    fn test_undecodable_bytes_yield_an_empty_document() {
        assert!(cells_from_slice(b"not json at all").is_empty());
        assert!(cells_from_slice(b"").is_empty());
        assert!(cells_from_slice(b"{\"kind\": \"code\"}").is_empty());
    }

    #[test]
    fn test_rendered_outputs_persist_with_the_cell() {
        let request = parse("GET https://example.com/a").expect("request");
        let response = normalize(
            TransportOutcome::success(TransportResponse {
                status: Some(200),
                body: Some("hello".to_string()),
                ..TransportResponse::default()
            }),
            &request,
        );
        let output = render(&response);

        let cell = CellRecord::code("restnote", "GET https://example.com/a")
            .with_outputs(output_records(&output));

        let bytes = cells_to_vec(&[cell]).expect("encode");
        let decoded = cells_from_slice(&bytes);
        assert_eq!(decoded.len(), 1);
        let structured = decoded[0]
            .outputs
            .iter()
            .find(|record| record.mime == MIME_STRUCTURED)
            .expect("structured output");
        assert_eq!(structured.value["status"], serde_json::json!(200));
    }
}
