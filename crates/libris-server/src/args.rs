//! Tool argument types
//!
//! One struct per tool, deserialized from the MCP call arguments and
//! validated before any service runs. Schemas are derived for the MCP tool
//! listing.

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// Arguments for the catalog_search tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for document-level hybrid search")]
pub struct CatalogSearchArgs {
    /// Natural-language query
    #[validate(length(min = 1, max = 1000, message = "text must be 1-1000 characters"))]
    #[schemars(description = "Natural-language query over document summaries")]
    pub text: String,
    /// Maximum results (1-20)
    #[validate(range(min = 1, max = 20, message = "limit must be between 1 and 20"))]
    #[serde(default = "default_catalog_limit")]
    #[schemars(description = "Maximum number of documents to return")]
    pub limit: usize,
    /// Attach per-signal score breakdowns
    #[serde(default)]
    #[schemars(description = "Include per-signal scores and expanded terms")]
    pub debug: bool,
}

/// Arguments for the chunks_search tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for searching within one document")]
pub struct ChunksSearchArgs {
    /// Natural-language query
    #[validate(length(min = 1, max = 1000, message = "text must be 1-1000 characters"))]
    #[schemars(description = "Natural-language query over the document's chunks")]
    pub text: String,
    /// Source filename to search within
    #[validate(length(min = 1, message = "source must not be empty"))]
    #[schemars(description = "Filename of the document to search within")]
    pub source: String,
    /// Maximum results (1-50)
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    #[serde(default = "default_chunk_limit")]
    #[schemars(description = "Maximum number of chunks to return")]
    pub limit: usize,
}

/// Arguments for the broad_chunks_search tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for corpus-wide passage search")]
pub struct BroadChunksSearchArgs {
    /// Natural-language query
    #[validate(length(min = 1, max = 1000, message = "text must be 1-1000 characters"))]
    #[schemars(description = "Natural-language query over all chunks")]
    pub text: String,
    /// Maximum results (1-50)
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    #[serde(default = "default_chunk_limit")]
    #[schemars(description = "Maximum number of chunks to return")]
    pub limit: usize,
    /// Attach per-signal score breakdowns
    #[serde(default)]
    #[schemars(description = "Include per-signal scores and expanded terms")]
    pub debug: bool,
}

/// Arguments for the concept_search tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for concept-centric chunk retrieval")]
pub struct ConceptSearchArgs {
    /// Concept name (display form accepted)
    #[validate(length(min = 1, max = 200, message = "concept must be 1-200 characters"))]
    #[schemars(description = "Concept to look up, e.g. 'repository pattern'")]
    pub concept: String,
    /// Maximum chunks (1-50)
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    #[serde(default = "default_chunk_limit")]
    #[schemars(description = "Maximum number of chunks to return")]
    pub limit: usize,
    /// Case-insensitive substring filter over owning filenames
    #[serde(default, rename = "sourceFilter")]
    #[schemars(description = "Only return chunks from sources matching this substring")]
    pub source_filter: Option<String>,
    /// Sort order: density (default), relevance or source
    #[validate(custom(function = "validate_sort_by", message = "invalid sortBy"))]
    #[serde(default, rename = "sortBy")]
    #[schemars(description = "Chunk ordering: density, relevance or source")]
    pub sort_by: Option<String>,
}

/// Arguments for the extract_concepts tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for reading a document's stored concepts")]
pub struct ExtractConceptsArgs {
    /// Source filename
    #[validate(length(min = 1, message = "source must not be empty"))]
    #[schemars(description = "Filename of the ingested document")]
    pub source: String,
}

/// Arguments for the source_concepts tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for listing one document's concepts")]
pub struct SourceConceptsArgs {
    /// Source filename
    #[validate(length(min = 1, message = "source must not be empty"))]
    #[schemars(description = "Filename of the ingested document")]
    pub source: String,
    /// Maximum concepts (1-200)
    #[validate(range(min = 1, max = 200, message = "limit must be between 1 and 200"))]
    #[serde(default = "default_concept_limit")]
    #[schemars(description = "Maximum number of concepts to return")]
    pub limit: usize,
}

/// Arguments for the concept_sources tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for listing the documents mentioning a concept")]
pub struct ConceptSourcesArgs {
    /// Concept name
    #[validate(length(min = 1, max = 200, message = "concept must be 1-200 characters"))]
    #[schemars(description = "Concept to resolve to documents")]
    pub concept: String,
    /// Maximum documents (1-50)
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    #[serde(default = "default_chunk_limit")]
    #[schemars(description = "Maximum number of documents to return")]
    pub limit: usize,
}

/// Arguments for the category_search tool
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Parameters for listing a category's documents")]
pub struct CategorySearchArgs {
    /// Category name
    #[validate(length(min = 1, max = 200, message = "category must be 1-200 characters"))]
    #[schemars(description = "Category name, case-insensitive")]
    pub category: String,
}

/// Arguments for the list_categories tool
#[derive(Debug, Default, Deserialize, JsonSchema, Validate)]
#[schemars(description = "No parameters")]
pub struct ListCategoriesArgs {}

/// Arguments for the corpus_status tool
#[derive(Debug, Default, Deserialize, JsonSchema, Validate)]
#[schemars(description = "No parameters")]
pub struct CorpusStatusArgs {}

fn default_catalog_limit() -> usize {
    5
}

fn default_chunk_limit() -> usize {
    10
}

fn default_concept_limit() -> usize {
    50
}

fn validate_sort_by(value: &str) -> Result<(), validator::ValidationError> {
    match value.to_lowercase().as_str() {
        "density" | "relevance" | "source" => Ok(()),
        _ => Err(validator::ValidationError::new(
            "sortBy must be density, relevance or source",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_limit_is_capped_at_twenty() {
        let args: CatalogSearchArgs =
            serde_json::from_value(serde_json::json!({"text": "q", "limit": 21})).unwrap();
        assert!(args.validate().is_err());
        let args: CatalogSearchArgs =
            serde_json::from_value(serde_json::json!({"text": "q"})).unwrap();
        assert!(args.validate().is_ok());
        assert_eq!(args.limit, 5);
    }

    #[test]
    fn empty_text_is_rejected() {
        let args: BroadChunksSearchArgs =
            serde_json::from_value(serde_json::json!({"text": ""})).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn sort_by_accepts_known_orders_only() {
        let args: ConceptSearchArgs = serde_json::from_value(
            serde_json::json!({"concept": "bm25", "sortBy": "relevance"}),
        )
        .unwrap();
        assert!(args.validate().is_ok());

        let args: ConceptSearchArgs = serde_json::from_value(
            serde_json::json!({"concept": "bm25", "sortBy": "alphabetical"}),
        )
        .unwrap();
        assert!(args.validate().is_err());
    }
}
