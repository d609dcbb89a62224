//! Tool registry
//!
//! Centralizes the tool definitions and schema generation for the MCP
//! list_tools response.

use rmcp::model::Tool;
use rmcp::ErrorData as McpError;
use std::borrow::Cow;
use std::sync::Arc;

use crate::args::{
    BroadChunksSearchArgs, CatalogSearchArgs, CategorySearchArgs, ChunksSearchArgs,
    ConceptSearchArgs, ConceptSourcesArgs, CorpusStatusArgs, ExtractConceptsArgs,
    ListCategoriesArgs, SourceConceptsArgs,
};

/// Tool definitions for the MCP protocol
pub struct ToolDefinitions;

impl ToolDefinitions {
    fn create_tool(
        name: &'static str,
        description: &'static str,
        schema: schemars::Schema,
    ) -> Result<Tool, McpError> {
        let schema_value = serde_json::to_value(schema)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let input_schema = schema_value
            .as_object()
            .ok_or_else(|| {
                McpError::internal_error(format!("schema for {} is not an object", name), None)
            })?
            .clone();

        Ok(Tool {
            name: Cow::Borrowed(name),
            title: None,
            description: Some(Cow::Borrowed(description)),
            input_schema: Arc::new(input_schema),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: Default::default(),
        })
    }
}

/// The complete tool list for the MCP list_tools response
pub fn create_tool_list() -> Result<Vec<Tool>, McpError> {
    Ok(vec![
        ToolDefinitions::create_tool(
            "catalog_search",
            "Hybrid search over document summaries; returns ranked documents",
            schemars::schema_for!(CatalogSearchArgs),
        )?,
        ToolDefinitions::create_tool(
            "chunks_search",
            "Hybrid search over the chunks of one document",
            schemars::schema_for!(ChunksSearchArgs),
        )?,
        ToolDefinitions::create_tool(
            "broad_chunks_search",
            "Hybrid search over all chunks in the corpus",
            schemars::schema_for!(BroadChunksSearchArgs),
        )?,
        ToolDefinitions::create_tool(
            "concept_search",
            "Find the chunks where a concept appears, with related concepts",
            schemars::schema_for!(ConceptSearchArgs),
        )?,
        ToolDefinitions::create_tool(
            "extract_concepts",
            "Read the stored concepts, categories and related concepts of a document",
            schemars::schema_for!(ExtractConceptsArgs),
        )?,
        ToolDefinitions::create_tool(
            "source_concepts",
            "List one document's concepts by mention frequency",
            schemars::schema_for!(SourceConceptsArgs),
        )?,
        ToolDefinitions::create_tool(
            "concept_sources",
            "List the documents mentioning a concept",
            schemars::schema_for!(ConceptSourcesArgs),
        )?,
        ToolDefinitions::create_tool(
            "category_search",
            "List a category's documents and aggregated concepts",
            schemars::schema_for!(CategorySearchArgs),
        )?,
        ToolDefinitions::create_tool(
            "list_categories",
            "List the category taxonomy with document counts",
            schemars::schema_for!(ListCategoriesArgs),
        )?,
        ToolDefinitions::create_tool(
            "corpus_status",
            "Table row counts, provider info and resilience health",
            schemars::schema_for!(CorpusStatusArgs),
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_list_covers_the_public_surface() {
        let tools = create_tool_list().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        for expected in [
            "catalog_search",
            "chunks_search",
            "broad_chunks_search",
            "concept_search",
            "extract_concepts",
            "source_concepts",
            "concept_sources",
            "category_search",
            "list_categories",
            "corpus_status",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }
    }
}
