//! Response formatting
//!
//! Every tool response is a single JSON text content item. Validation
//! failures and service errors come back as `isError` results with a
//! human-readable message; protocol-level errors are reserved for unknown
//! tools and serialization faults.

use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData as McpError;
use serde_json::Value;

use libris_application::ChunkHit;
use libris_domain::entities::{CatalogEntry, CategoryRow, ChunkRow, ConceptRow};
use libris_domain::error::Error;
use libris_domain::value_objects::RankedResult;

/// Characters of chunk text included in payloads
const CHUNK_TEXT_PREVIEW: usize = 2000;

/// Response formatter for the retrieval tools
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Wrap a JSON payload as a successful tool result
    pub fn json(payload: Value) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(&payload)
            .map_err(|e| McpError::internal_error(format!("serialization failed: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// A validation failure; the service layer was never invoked
    pub fn validation_error(message: impl Into<String>) -> CallToolResult {
        CallToolResult::error(vec![Content::text(format!(
            "Invalid arguments: {}",
            message.into()
        ))])
    }

    /// A service-layer failure mapped to a structured error message
    pub fn service_error(error: &Error) -> CallToolResult {
        let message = match error {
            Error::CircuitOpen { operation } => format!(
                "Dependency unhealthy: circuit breaker open for '{}'. Retry later.",
                operation
            ),
            Error::BulkheadFull { operation, .. } => format!(
                "Server saturated: too many concurrent '{}' calls. Retry after a delay.",
                operation
            ),
            Error::Timeout { operation, millis } => {
                format!("Operation '{}' timed out after {}ms.", operation, millis)
            }
            other => other.to_string(),
        };
        CallToolResult::error(vec![Content::text(message)])
    }

    /// Payload row for a ranked catalog entry
    pub fn document(result: &RankedResult<CatalogEntry>) -> Value {
        let mut payload = serde_json::json!({
            "id": result.row.id,
            "filename": result.row.filename,
            "summary": result.row.text,
            "score": result.hybrid_score,
            "distance": result.distance,
        });
        if !result.row.category_ids.is_empty() {
            payload["category_ids"] = serde_json::json!(result.row.category_ids);
        }
        Self::attach_debug(
            &mut payload,
            &result.breakdown,
            &result.matched_concepts,
            &result.expanded_terms,
        );
        payload
    }

    /// Payload row for a ranked chunk
    pub fn chunk_hit(hit: &ChunkHit) -> Value {
        let mut payload = serde_json::json!({
            "id": hit.result.row.id,
            "source": hit.source,
            "text": preview(&hit.result.row.text),
            "loc": hit.result.row.loc,
            "score": hit.result.hybrid_score,
            "distance": hit.result.distance,
            "concept_ids": hit.result.row.concept_ids,
        });
        Self::attach_debug(
            &mut payload,
            &hit.result.breakdown,
            &hit.result.matched_concepts,
            &hit.result.expanded_terms,
        );
        payload
    }

    /// Payload row for a plain chunk (concept search)
    pub fn chunk(row: &ChunkRow) -> Value {
        serde_json::json!({
            "id": row.id,
            "catalog_id": row.catalog_id,
            "text": preview(&row.text),
            "loc": row.loc,
            "concept_count": row.concept_ids.len(),
        })
    }

    /// Payload row for a concept
    pub fn concept(row: &ConceptRow) -> Value {
        serde_json::json!({
            "id": row.id,
            "concept": row.concept,
            "weight": row.weight,
            "document_count": row.catalog_ids.len(),
            "synonyms": row.synonyms,
            "broader_terms": row.broader_terms,
        })
    }

    /// Payload row for a catalog entry without scores
    pub fn catalog_entry(row: &CatalogEntry) -> Value {
        serde_json::json!({
            "id": row.id,
            "filename": row.filename,
            "summary": row.text,
            "category_ids": row.category_ids,
        })
    }

    /// Payload row for a category
    pub fn category(row: &CategoryRow) -> Value {
        serde_json::json!({
            "id": row.id,
            "name": row.name,
            "document_count": row.document_count,
        })
    }

    fn attach_debug(
        payload: &mut Value,
        breakdown: &Option<libris_domain::value_objects::ScoreBreakdown>,
        matched_concepts: &[String],
        expanded_terms: &[String],
    ) {
        if let Some(breakdown) = breakdown {
            payload["scores"] = serde_json::json!({
                "vector": breakdown.vector_score,
                "bm25": breakdown.bm25_score,
                "title": breakdown.title_score,
                "concept": breakdown.concept_score,
                "wordnet": breakdown.wordnet_score,
            });
        }
        if !matched_concepts.is_empty() {
            payload["matched_concepts"] = serde_json::json!(matched_concepts);
        }
        if !expanded_terms.is_empty() {
            payload["expanded_terms"] = serde_json::json!(expanded_terms);
        }
    }
}

fn preview(text: &str) -> String {
    if text.len() <= CHUNK_TEXT_PREVIEW {
        return text.to_string();
    }
    let mut cut = CHUNK_TEXT_PREVIEW;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &text[..cut])
}
